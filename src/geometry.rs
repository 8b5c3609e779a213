//! Shape metrics for one interval of a camera path.
//!
//! All metrics operate on the positions `P = positions[start..end]`:
//!
//! - `flatness_error`: smallest singular value of `P` centred on its centroid.
//!   Near zero when the points are coplanar.
//! - `perimeter_error`: `|1 - 2π·r / L|` with `r` the mean distance to the
//!   centroid and `L` the closed path length.
//! - `endpoint_error`: gap between first and last point, divided by `L`.
//! - `pairwise_distribution`: population standard deviation of the step
//!   lengths.
//!
//! Step lengths always include the wrap-around step from the last point back
//! to the first, as if the interval were a closed loop.

use crate::error::{Result, SelectorError};
use crate::path::CameraPath;
use crate::types::{Interval, Metric, MetricRecord};
use nalgebra::{DMatrix, Vector3};

/// Value used for length-normalised metrics when the path has zero length.
pub const ZERO_LENGTH_SENTINEL: f64 = 1.0;

/// Closed-loop step statistics of a point sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathStats {
    pub length: f64,
    pub step_stddev: f64,
}

/// Computes a fixed subset of the geometric metrics.
#[derive(Clone, Debug)]
pub struct GeometricScorer {
    metrics: Vec<Metric>,
}

impl Default for GeometricScorer {
    fn default() -> Self {
        Self::new(&Metric::GEOMETRIC)
    }
}

impl GeometricScorer {
    /// Scorer for the geometric metrics among `metrics`; others are ignored.
    pub fn new(metrics: &[Metric]) -> Self {
        let mut selected: Vec<Metric> = Vec::with_capacity(4);
        for m in metrics.iter().copied().filter(Metric::is_geometric) {
            if !selected.contains(&m) {
                selected.push(m);
            }
        }
        Self { metrics: selected }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    fn wants(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Score `interval` of `path` into a fresh record.
    pub fn score(&self, path: &CameraPath, interval: Interval) -> Result<MetricRecord> {
        let mut record = MetricRecord::new(interval);
        self.score_into(path, &mut record)?;
        Ok(record)
    }

    /// Add the requested metrics to an existing record.
    pub fn score_into(&self, path: &CameraPath, record: &mut MetricRecord) -> Result<()> {
        let interval = record.interval;
        if interval.span() < 2 {
            return Err(SelectorError::Domain {
                interval,
                reason: format!("need at least 2 poses, interval holds {}", interval.span()),
            });
        }
        let points = path.positions_in(interval)?;
        let center = centroid(points);

        if self.wants(Metric::FlatnessError) {
            record.set(Metric::FlatnessError, flatness_error(points, &center));
        }

        let needs_stats = self.wants(Metric::PerimeterError)
            || self.wants(Metric::PairwiseDistribution)
            || self.wants(Metric::EndpointError);
        if !needs_stats {
            return Ok(());
        }
        let stats = path_statistics(points);

        if self.wants(Metric::PerimeterError) {
            let radius =
                points.iter().map(|p| (p - center).norm()).sum::<f64>() / points.len() as f64;
            let expected = 2.0 * std::f64::consts::PI * radius;
            record.set(
                Metric::PerimeterError,
                normalised_by_length(stats.length, |len| (1.0 - expected / len).abs()),
            );
        }

        if self.wants(Metric::PairwiseDistribution) {
            record.set(Metric::PairwiseDistribution, stats.step_stddev);
        }

        if self.wants(Metric::EndpointError) {
            let gap = (points[0] - points[points.len() - 1]).norm();
            record.set(
                Metric::EndpointError,
                normalised_by_length(stats.length, |len| gap / len),
            );
        }
        Ok(())
    }
}

fn normalised_by_length(length: f64, f: impl FnOnce(f64) -> f64) -> f64 {
    if length > 0.0 {
        f(length)
    } else {
        ZERO_LENGTH_SENTINEL
    }
}

/// Arithmetic mean of `points`. Returns the origin for an empty slice.
pub fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    points.iter().sum::<Vector3<f64>>() / points.len() as f64
}

/// Smallest singular value of the `n × 3` matrix of centred points.
pub fn flatness_error(points: &[Vector3<f64>], centroid: &Vector3<f64>) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let centered = DMatrix::from_fn(points.len(), 3, |r, c| points[r][c] - centroid[c]);
    let sigma = centered.singular_values();
    sigma.iter().copied().fold(f64::INFINITY, f64::min).max(0.0)
}

/// Step lengths between consecutive points plus the closing step, summarised
/// as total length and population standard deviation.
pub fn path_statistics(points: &[Vector3<f64>]) -> PathStats {
    if points.len() < 2 {
        return PathStats {
            length: 0.0,
            step_stddev: 0.0,
        };
    }
    let mut steps: Vec<f64> = points.windows(2).map(|w| (w[1] - w[0]).norm()).collect();
    steps.push((points[0] - points[points.len() - 1]).norm());

    let n = steps.len() as f64;
    let length: f64 = steps.iter().sum();
    let mean = length / n;
    let var = steps.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
    PathStats {
        length,
        step_stddev: var.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn circle(n: usize, radius: f64) -> Vec<Vector3<f64>> {
        (0..n)
            .map(|k| {
                let t = TAU * k as f64 / n as f64;
                Vector3::new(radius * t.cos(), 0.0, radius * t.sin())
            })
            .collect()
    }

    #[test]
    fn square_loop_statistics_include_closing_step() {
        let pts = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let stats = path_statistics(&pts);
        assert!((stats.length - 4.0).abs() < 1e-12);
        assert!(stats.step_stddev.abs() < 1e-12);
    }

    #[test]
    fn straight_line_is_flat_but_not_closed() {
        let pts: Vec<_> = (0..12).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        let path = CameraPath::from_positions(pts);
        let record = GeometricScorer::default()
            .score(&path, Interval::new(0, 11).unwrap())
            .unwrap();
        assert!(record.get(Metric::FlatnessError).unwrap() < 1e-9);
        // gap 10 over closed length 20
        let endpoint = record.get(Metric::EndpointError).unwrap();
        assert!((endpoint - 0.5).abs() < 1e-12, "endpoint={endpoint}");
    }

    #[test]
    fn circle_scores_near_zero() {
        let mut pts = circle(100, 2.0);
        pts.push(Vector3::new(5.0, 5.0, 5.0));
        let path = CameraPath::from_positions(pts);
        let record = GeometricScorer::default()
            .score(&path, Interval::new(0, 100).unwrap())
            .unwrap();
        assert!(record.get(Metric::FlatnessError).unwrap() < 1e-9);
        assert!(record.get(Metric::PerimeterError).unwrap() < 1e-3);
        assert!(record.get(Metric::PairwiseDistribution).unwrap() < 1e-3);
    }

    #[test]
    fn only_requested_metrics_are_written() {
        let path = CameraPath::from_positions(circle(40, 1.0));
        let scorer = GeometricScorer::new(&[Metric::EndpointError, Metric::Ssim]);
        let record = scorer.score(&path, Interval::new(0, 30).unwrap()).unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.contains(Metric::EndpointError));
    }

    #[test]
    fn single_pose_interval_is_a_domain_error() {
        let path = CameraPath::from_positions(circle(10, 1.0));
        let err = GeometricScorer::default()
            .score(&path, Interval::new(3, 4).unwrap())
            .unwrap_err();
        assert!(matches!(err, SelectorError::Domain { .. }));
    }

    #[test]
    fn stationary_camera_uses_sentinel() {
        let path = CameraPath::from_positions(vec![Vector3::new(1.0, 2.0, 3.0); 20]);
        let record = GeometricScorer::default()
            .score(&path, Interval::new(0, 15).unwrap())
            .unwrap();
        for (metric, value) in record.iter() {
            assert!(value.is_finite(), "{metric} not finite");
        }
        assert_eq!(
            record.get(Metric::PerimeterError),
            Some(ZERO_LENGTH_SENTINEL)
        );
        assert_eq!(record.get(Metric::EndpointError), Some(ZERO_LENGTH_SENTINEL));
    }
}
