//! Dense optical flow: field type, estimator trait and warping.
//!
//! A flow field maps every pixel `x` of the source image to its displacement
//! `u(x)` such that `source(x) ≈ target(x + u(x))`.

pub mod dis;
pub mod visualize;

pub use dis::{DisFlow, DisFlowParams};
pub use visualize::flow_to_rgb;

use crate::error::Result;
use crate::image::resize::resize_bilinear;
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Per-pixel displacement in pixels along x and y.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    pub dx: ImageF32,
    pub dy: ImageF32,
}

impl FlowField {
    pub fn zeros(w: usize, h: usize) -> Self {
        Self {
            dx: ImageF32::new(w, h),
            dy: ImageF32::new(w, h),
        }
    }

    /// Constant displacement everywhere.
    pub fn uniform(w: usize, h: usize, dx: f32, dy: f32) -> Self {
        Self {
            dx: ImageF32::from_fn(w, h, |_, _| dx),
            dy: ImageF32::from_fn(w, h, |_, _| dy),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dx.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dx.h
    }

    /// Bilinearly resample to `w × h` and multiply displacements by `factor`.
    pub fn resized(&self, w: usize, h: usize, factor: f32) -> Self {
        let mut dx = resize_bilinear(&self.dx, w, h);
        let mut dy = resize_bilinear(&self.dy, w, h);
        dx.scale_values(factor);
        dy.scale_values(factor);
        Self { dx, dy }
    }

    /// Copy of the rectangle `[x0, x1) × [y0, y1)`; displacements are kept.
    pub fn crop(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self {
            dx: self.dx.crop(x0, y0, x1, y1),
            dy: self.dy.crop(x0, y0, x1, y1),
        }
    }

    /// Resample to `w × h`, scaling each component by its axis ratio.
    pub fn upscaled_to(&self, w: usize, h: usize) -> Self {
        let sx = w as f32 / self.width().max(1) as f32;
        let sy = h as f32 / self.height().max(1) as f32;
        let mut out = self.resized(w, h, 1.0);
        out.dx.scale_values(sx);
        out.dy.scale_values(sy);
        out
    }

    /// Mean displacement, for diagnostics.
    pub fn mean(&self) -> (f32, f32) {
        let n = (self.width() * self.height()).max(1) as f32;
        (
            self.dx.data.iter().sum::<f32>() / n,
            self.dy.data.iter().sum::<f32>() / n,
        )
    }
}

/// Dense flow estimator.
///
/// Implementations may keep scratch state between calls, hence `&mut self`.
pub trait DenseFlow {
    /// Flow from `from` to `to`; both images must share dimensions.
    fn calc(&mut self, from: &ImageF32, to: &ImageF32) -> Result<FlowField>;
}

/// Backward warp: `out(x) = image(x - flow(x))`, bilinear, replicate border.
///
/// With a flow estimated from `image` to another frame, the result predicts
/// that other frame.
pub fn warp_backward(image: &ImageF32, flow: &FlowField) -> ImageF32 {
    let (w, h) = (flow.width(), flow.height());
    let mut out = ImageF32::new(w, h);
    if image.w == 0 || image.h == 0 {
        return out;
    }
    for y in 0..h {
        let dx_row = flow.dx.row(y);
        let dy_row = flow.dy.row(y);
        for (x, dst) in out.row_mut(y).iter_mut().enumerate() {
            *dst = image.sample_bilinear(x as f32 - dx_row[x], y as f32 - dy_row[x]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flow_warp_is_identity() {
        let img = ImageF32::from_fn(9, 7, |x, y| ((x * 3 + y) % 5) as f32 / 5.0);
        let out = warp_backward(&img, &FlowField::zeros(9, 7));
        assert_eq!(out, img);
    }

    #[test]
    fn uniform_flow_shifts_content() {
        let img = ImageF32::from_fn(10, 4, |x, _| x as f32);
        let out = warp_backward(&img, &FlowField::uniform(10, 4, 2.0, 0.0));
        assert_eq!(out.get(5, 1), 3.0);
        // replicate border on the left
        assert_eq!(out.get(0, 0), 0.0);
    }

    #[test]
    fn cropping_keeps_displacements() {
        let flow = FlowField {
            dx: ImageF32::from_fn(6, 2, |x, _| x as f32),
            dy: ImageF32::from_fn(6, 2, |_, y| -(y as f32)),
        };
        let inner = flow.crop(2, 0, 4, 2);
        assert_eq!((inner.width(), inner.height()), (2, 2));
        assert_eq!(inner.dx.get(0, 0), 2.0);
        assert_eq!(inner.dy.get(1, 1), -1.0);
    }

    #[test]
    fn resizing_scales_displacements() {
        let flow = FlowField::uniform(4, 4, 1.5, -0.5);
        let up = flow.resized(8, 8, 2.0);
        assert_eq!((up.width(), up.height()), (8, 8));
        assert!((up.dx.get(3, 3) - 3.0).abs() < 1e-6);
        assert!((up.dy.get(7, 0) + 1.0).abs() < 1e-6);
    }
}
