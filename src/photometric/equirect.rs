//! Equirectangular slicing and cropping.
//!
//! A full panorama spans `2π` horizontally. To cut a window centred on an
//! arbitrary heading without special-casing the seam, the image is tiled three
//! times side by side and the window is taken from the tiled strip:
//!
//! ```text
//! lookat = round(w3 · (3π + angle) / 6π)        w3 = 3 · width
//! slice  = [lookat - width/4 - pad, lookat + width/4 + pad)
//! ```
//!
//! `width/4` on either side makes the slice one hemisphere wide.

use crate::error::{Result, SelectorError};
use crate::image::ColorImage;
use std::f64::consts::PI;

/// Column range `[x0, x1)` of the padded hemisphere inside the tiled strip.
pub fn hemisphere_columns(width: usize, angle: f64, padding_px: usize) -> (usize, usize) {
    let w3 = 3 * width;
    let lookat = (w3 as f64 * (3.0 * PI + angle) / (6.0 * PI)).round_ties_even() as isize;
    let half = (width / 4 + padding_px) as isize;
    let x0 = (lookat - half).clamp(0, w3 as isize) as usize;
    let x1 = (lookat + half).clamp(0, w3 as isize) as usize;
    (x0, x1)
}

/// Forward-facing hemisphere around `angle` (radians, `atan2(x, z)`
/// convention), widened by `padding_px` columns on each side.
pub fn slice_equirect(image: &ColorImage, angle: f64, padding_px: usize) -> Result<ColorImage> {
    let (w, h) = (image.width(), image.height());
    if w < 4 || h == 0 {
        return Err(SelectorError::ImageTooSmall {
            width: w,
            height: h,
            operation: "hemisphere slicing",
        });
    }
    let (x0, x1) = hemisphere_columns(w, angle, padding_px);
    let tiled = image.tile_horizontal(3);
    Ok(tiled.crop(x0, 0, x1, h))
}

/// Drop `padding` columns from both sides.
pub fn unpad(image: &ColorImage, padding: usize) -> Result<ColorImage> {
    let (w, h) = (image.width(), image.height());
    if 2 * padding >= w {
        return Err(SelectorError::ImageTooSmall {
            width: w,
            height: h,
            operation: "removing slice padding",
        });
    }
    Ok(image.crop(padding, 0, w - padding, h))
}

/// Rows removed at each pole for a given height, rounding ties to even.
pub fn pole_margin(height: usize, fraction: f64) -> usize {
    (fraction * height as f64).round_ties_even().max(0.0) as usize
}

/// Remove `pole_margin(h, fraction)` rows at the top and at the bottom.
pub fn crop_poles(image: &ColorImage, fraction: f64) -> Result<ColorImage> {
    let (w, h) = (image.width(), image.height());
    let margin = pole_margin(h, fraction);
    if 2 * margin >= h {
        return Err(SelectorError::ImageTooSmall {
            width: w,
            height: h,
            operation: "cropping poles",
        });
    }
    Ok(image.crop(0, margin, w, h - margin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_ramp(w: usize, h: usize) -> ColorImage {
        ColorImage::from_fn(w, h, |x, _| {
            let v = x as f32 / w as f32;
            [v, v, v]
        })
    }

    #[test]
    fn zero_heading_centres_on_middle_copy() {
        // w3 = 1200, lookat = 1200 * 3π / 6π = 600
        assert_eq!(hemisphere_columns(400, 0.0, 0), (500, 700));
        assert_eq!(hemisphere_columns(400, 0.0, 20), (480, 720));
    }

    #[test]
    fn slice_wraps_across_the_seam() {
        let img = column_ramp(400, 10);
        // heading π puts the window centre on the seam between copies 2 and 3
        let slice = slice_equirect(&img, PI, 0).unwrap();
        assert_eq!(slice.width(), 200);
        let left = slice.channels[0].get(0, 0);
        let right = slice.channels[0].get(199, 0);
        assert_eq!(left, img.channels[0].get(300, 0));
        assert_eq!(right, img.channels[0].get(99, 0));
    }

    #[test]
    fn pole_margin_rounds_half_to_even() {
        // 0.05 * 50 = 2.5 -> 2, 0.05 * 70 = 3.5 -> 4
        assert_eq!(pole_margin(50, 0.05), 2);
        assert_eq!(pole_margin(70, 0.05), 4);
        assert_eq!(pole_margin(100, 0.05), 5);
    }

    #[test]
    fn unpad_and_crop_poles_shrink_extent() {
        let img = column_ramp(60, 40);
        let out = crop_poles(&unpad(&img, 5).unwrap(), 0.05).unwrap();
        assert_eq!((out.width(), out.height()), (50, 36));
        assert!(unpad(&img, 30).is_err());
    }
}
