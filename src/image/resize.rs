//! Resampling helpers.
//!
//! - `resize_area`: pixel-area averaging, used for downscaling.
//! - `resize_bilinear`: half-pixel-centred bilinear interpolation.
//! - `scaled_dims`: `floor(dim * percent / 100)` target dimensions.

use super::f32::ImageF32;
use super::traits::{ImageView, ImageViewMut};

/// Target size for a percentage scale, truncating like an integer cast.
pub fn scaled_dims(w: usize, h: usize, percent: u32) -> (usize, usize) {
    (
        w * percent as usize / 100,
        h * percent as usize / 100,
    )
}

/// Downscale by averaging the source area covered by each output pixel.
///
/// Falls back to bilinear interpolation when either axis is enlarged.
pub fn resize_area(src: &ImageF32, dst_w: usize, dst_h: usize) -> ImageF32 {
    if dst_w == 0 || dst_h == 0 || src.w == 0 || src.h == 0 {
        return ImageF32::new(dst_w, dst_h);
    }
    if dst_w > src.w || dst_h > src.h {
        return resize_bilinear(src, dst_w, dst_h);
    }
    let x_taps = area_taps(src.w, dst_w);
    let y_taps = area_taps(src.h, dst_h);

    let mut horiz = ImageF32::new(dst_w, src.h);
    for y in 0..src.h {
        let src_row = src.row(y);
        for (dst_px, taps) in horiz.row_mut(y).iter_mut().zip(&x_taps) {
            *dst_px = taps.iter().map(|&(i, wt)| wt * src_row[i]).sum();
        }
    }

    let mut out = ImageF32::new(dst_w, dst_h);
    for (y, taps) in y_taps.iter().enumerate() {
        let dst_row = out.row_mut(y);
        for &(sy, wt) in taps {
            for (dst_px, &v) in dst_row.iter_mut().zip(horiz.row(sy)) {
                *dst_px += wt * v;
            }
        }
    }
    out
}

/// Source indices and normalised overlap weights for each output sample.
fn area_taps(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let lo = d as f64 * scale;
            let hi = ((d + 1) as f64 * scale).min(src_len as f64);
            let mut taps = Vec::new();
            let mut s = lo.floor() as usize;
            while (s as f64) < hi && s < src_len {
                let overlap = (hi.min((s + 1) as f64) - lo.max(s as f64)).max(0.0);
                if overlap > 1e-12 {
                    taps.push((s, (overlap / scale) as f32));
                }
                s += 1;
            }
            taps
        })
        .collect()
}

/// Bilinear resize with half-pixel centres and clamped borders.
pub fn resize_bilinear(src: &ImageF32, dst_w: usize, dst_h: usize) -> ImageF32 {
    if dst_w == 0 || dst_h == 0 || src.w == 0 || src.h == 0 {
        return ImageF32::new(dst_w, dst_h);
    }
    let sx = src.w as f32 / dst_w as f32;
    let sy = src.h as f32 / dst_h as f32;
    ImageF32::from_fn(dst_w, dst_h, |x, y| {
        let fx = (x as f32 + 0.5) * sx - 0.5;
        let fy = (y as f32 + 0.5) * sy - 0.5;
        src.sample_bilinear(fx, fy)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halving_averages_two_by_two_blocks() {
        let src = ImageF32::from_fn(4, 2, |x, y| (x + 4 * y) as f32);
        let half = resize_area(&src, 2, 1);
        assert!((half.get(0, 0) - 2.5).abs() < 1e-6);
        assert!((half.get(1, 0) - 4.5).abs() < 1e-6);
    }

    #[test]
    fn fractional_area_weights_sum_to_one() {
        let src = ImageF32::from_fn(7, 5, |_, _| 0.75);
        let out = resize_area(&src, 3, 2);
        for &v in &out.data {
            assert!((v - 0.75).abs() < 1e-5, "v={v}");
        }
    }

    #[test]
    fn bilinear_upscale_preserves_constant_and_ramp_ends() {
        let src = ImageF32::from_fn(3, 3, |x, _| x as f32);
        let up = resize_bilinear(&src, 6, 6);
        assert_eq!(up.get(0, 0), 0.0);
        assert_eq!(up.get(5, 5), 2.0);
        assert!((up.get(2, 3) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn percentage_dims_truncate() {
        assert_eq!(scaled_dims(1001, 499, 25), (250, 124));
    }
}
