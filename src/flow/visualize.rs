//! Colour coding of flow fields for debug output.
//!
//! Hue encodes the displacement direction (0° along +x, 90° along +y) and
//! value the magnitude, normalised to the largest displacement in the field.
//! Saturation is always full, so a zero field renders black.

use super::FlowField;
use crate::image::ImageView;
use image::{Rgb, RgbImage};
use std::f32::consts::TAU;

/// Render `flow` as an 8-bit RGB image of the same size.
pub fn flow_to_rgb(flow: &FlowField) -> RgbImage {
    let (w, h) = (flow.width(), flow.height());
    let mut max_mag = 0.0f32;
    for y in 0..h {
        for (dx, dy) in flow.dx.row(y).iter().zip(flow.dy.row(y)) {
            max_mag = max_mag.max(dx.hypot(*dy));
        }
    }

    let mut out = RgbImage::new(w as u32, h as u32);
    for y in 0..h {
        let dx_row = flow.dx.row(y);
        let dy_row = flow.dy.row(y);
        for x in 0..w {
            let (dx, dy) = (dx_row[x], dy_row[x]);
            let hue = dy.atan2(dx).rem_euclid(TAU) * 360.0 / TAU;
            let value = if max_mag > 0.0 {
                dx.hypot(dy) / max_mag
            } else {
                0.0
            };
            out.put_pixel(x as u32, y as u32, hsv_to_rgb(hue, 1.0, value));
        }
    }
    out
}

/// `hue` in degrees, `saturation` and `value` in `[0, 1]`.
fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb<u8> {
    let c = value * saturation;
    let sector = hue / 60.0;
    let x = c * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let q = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([q(r), q(g), q(b)])
}
