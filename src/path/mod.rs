//! Camera trajectory container.
//!
//! A `CameraPath` holds N poses as parallel arrays of positions, orientations
//! and source frame indices. It is built once and never mutated afterwards;
//! scoring stages borrow it immutably, including across worker threads.

pub mod loader;

pub use loader::{load_trajectory, parse_trajectory};

use crate::error::{Result, SelectorError};
use crate::types::Interval;
use nalgebra::{UnitQuaternion, Vector3};

/// One reconstructed camera pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// Video frame the pose was reconstructed from.
    pub frame_index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct CameraPath {
    positions: Vec<Vector3<f64>>,
    orientations: Vec<UnitQuaternion<f64>>,
    frame_indices: Vec<usize>,
}

impl CameraPath {
    pub fn from_poses(poses: impl IntoIterator<Item = CameraPose>) -> Self {
        let mut path = Self::default();
        for pose in poses {
            path.positions.push(pose.position);
            path.orientations.push(pose.orientation);
            path.frame_indices.push(pose.frame_index);
        }
        path
    }

    /// Path with identity orientations; frame indices follow the row order.
    pub fn from_positions(positions: Vec<Vector3<f64>>) -> Self {
        let n = positions.len();
        Self {
            positions,
            orientations: vec![UnitQuaternion::identity(); n],
            frame_indices: (0..n).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn orientations(&self) -> &[UnitQuaternion<f64>] {
        &self.orientations
    }

    pub fn pose(&self, index: usize) -> Option<CameraPose> {
        Some(CameraPose {
            position: *self.positions.get(index)?,
            orientation: *self.orientations.get(index)?,
            frame_index: *self.frame_indices.get(index)?,
        })
    }

    /// Fails unless both endpoints of `interval` index into the path.
    pub fn check_interval(&self, interval: Interval) -> Result<()> {
        if interval.end() >= self.len() {
            return Err(SelectorError::IntervalOutOfRange {
                interval,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Positions `[start, end)` of `interval`.
    pub fn positions_in(&self, interval: Interval) -> Result<&[Vector3<f64>]> {
        self.check_interval(interval)?;
        Ok(&self.positions[interval.start()..interval.end()])
    }

    /// Source video frames at the two endpoints of `interval`.
    pub fn frame_range(&self, interval: Interval) -> Result<(usize, usize)> {
        self.check_interval(interval)?;
        Ok((
            self.frame_indices[interval.start()],
            self.frame_indices[interval.end()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_must_fit_inside_path() {
        let path = CameraPath::from_positions(vec![Vector3::zeros(); 20]);
        let inside = Interval::new(0, 19).unwrap();
        assert_eq!(path.positions_in(inside).unwrap().len(), 19);
        let outside = Interval::new(0, 20).unwrap();
        assert!(matches!(
            path.positions_in(outside),
            Err(SelectorError::IntervalOutOfRange { len: 20, .. })
        ));
    }

    #[test]
    fn frame_range_reports_source_frames() {
        let poses = (0..15).map(|i| CameraPose {
            position: Vector3::new(i as f64, 0.0, 0.0),
            orientation: UnitQuaternion::identity(),
            frame_index: 100 + 2 * i,
        });
        let path = CameraPath::from_poses(poses);
        let range = path.frame_range(Interval::new(2, 12).unwrap()).unwrap();
        assert_eq!(range, (104, 124));
    }
}
