//! Trajectory text loader.
//!
//! Each non-empty line holds `timestamp tx ty tz qx qy qz qw`, separated by
//! whitespace. Timestamps are converted to video frame indices with
//! `int(timestamp * fps + 0.5)`; poses keep their row order.

use super::{CameraPath, CameraPose};
use crate::error::{Result, SelectorError};
use log::debug;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use std::fs;
use std::path::Path;

const FIELDS_PER_ROW: usize = 8;

/// Read and parse a trajectory file.
pub fn load_trajectory(path: &Path, fps: f64) -> Result<CameraPath> {
    let contents = fs::read_to_string(path).map_err(|e| SelectorError::io(path, e))?;
    let camera_path = parse_trajectory(&contents, fps, path)?;
    debug!(
        "loaded {} poses from {} at {fps} fps",
        camera_path.len(),
        path.display()
    );
    Ok(camera_path)
}

/// Parse trajectory text; `source` only names the input in errors.
pub fn parse_trajectory(contents: &str, fps: f64, source: &Path) -> Result<CameraPath> {
    let mut poses = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let pose = parse_row(line, fps).map_err(|reason| SelectorError::MalformedTrajectory {
            path: source.to_path_buf(),
            line: line_no + 1,
            reason,
        })?;
        poses.push(pose);
    }
    if poses.is_empty() {
        return Err(SelectorError::EmptyTrajectory(source.to_path_buf()));
    }
    Ok(CameraPath::from_poses(poses))
}

fn parse_row(line: &str, fps: f64) -> std::result::Result<CameraPose, String> {
    let values = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|e| format!("invalid number `{tok}`: {e}"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if values.len() < FIELDS_PER_ROW {
        return Err(format!(
            "expected {FIELDS_PER_ROW} fields, found {}",
            values.len()
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err("non-finite value".to_string());
    }

    let timestamp = values[0];
    let frame = timestamp * fps + 0.5;
    if frame < 0.0 {
        return Err(format!("negative timestamp {timestamp}"));
    }

    let position = Vector3::new(values[1], values[2], values[3]);
    let quat = Quaternion::new(values[7], values[4], values[5], values[6]);
    if quat.norm() <= f64::EPSILON {
        return Err("zero-norm orientation quaternion".to_string());
    }

    Ok(CameraPose {
        position,
        orientation: UnitQuaternion::from_quaternion(quat),
        frame_index: frame as usize,
    })
}
