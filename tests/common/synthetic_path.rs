use circle_selector::CameraPath;
use nalgebra::Vector3;
use std::f64::consts::TAU;

/// `n` positions on the unit circle in the x-z plane, one full turn.
pub fn unit_circle(n: usize) -> Vec<Vector3<f64>> {
    (0..n)
        .map(|k| {
            let t = TAU * k as f64 / n as f64;
            Vector3::new(t.cos(), 0.0, t.sin())
        })
        .collect()
}

/// Deterministic off-plane points scattered around the circle.
pub fn outliers(n: usize) -> Vec<Vector3<f64>> {
    (0..n)
        .map(|k| {
            let k = k as f64;
            Vector3::new(
                2.5 * (1.7 * k + 0.3).sin(),
                1.5 * (0.9 * k + 1.1).cos(),
                2.5 * (2.3 * k + 0.7).sin(),
            )
        })
        .collect()
}

/// `circle_points` poses on the circle followed by `outlier_points` outliers.
pub fn circle_with_outliers(circle_points: usize, outlier_points: usize) -> CameraPath {
    let mut positions = unit_circle(circle_points);
    positions.extend(outliers(outlier_points));
    CameraPath::from_positions(positions)
}

/// `poses` positions walking a circle of `period` poses per turn, followed by
/// `outlier_points` outliers.
pub fn looping_walk(poses: usize, period: usize, outlier_points: usize) -> CameraPath {
    let mut positions: Vec<_> = (0..poses)
        .map(|k| {
            let t = TAU * k as f64 / period as f64;
            Vector3::new(t.cos(), 0.0, t.sin())
        })
        .collect();
    positions.extend(outliers(outlier_points));
    CameraPath::from_positions(positions)
}
