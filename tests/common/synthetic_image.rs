use circle_selector::image::ColorImage;
use std::f32::consts::TAU;

/// Smooth colour panorama; `phase` in `[0, 1)` rotates it horizontally with
/// wrap-around, the way a yaw rotation moves an equirectangular image.
pub fn panorama(width: usize, height: usize, phase: f32) -> ColorImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    ColorImage::from_fn(width, height, |x, y| {
        let u = (x as f32 / width as f32 + phase) * TAU;
        let v = y as f32 / height as f32 * TAU;
        let a = 0.5 + 0.3 * (3.0 * u).sin() * (2.0 * v).cos();
        let b = 0.5 + 0.25 * (5.0 * u + v).cos();
        [a, b, 0.5 * (a + b)]
    })
}

/// One frame per pose; frames `k` and `k + period` are identical.
pub fn periodic_frames(count: usize, period: usize, width: usize, height: usize) -> Vec<ColorImage> {
    (0..count)
        .map(|k| panorama(width, height, (k % period) as f32 / period as f32))
        .collect()
}
