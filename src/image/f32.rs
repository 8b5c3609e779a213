//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Intensities are kept in `[0, 1]`. Flow fields reuse the same buffer type
//! with pixel displacements as values.
use super::traits::{ImageView, ImageViewMut};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut out = Self::new(w, h);
        for y in 0..h {
            for (x, px) in out.row_mut(y).iter_mut().enumerate() {
                *px = f(x, y);
            }
        }
        out
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Sample at a clamped integer location (replicate border).
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.w as isize - 1) as usize;
        let cy = y.clamp(0, self.h as isize - 1) as usize;
        self.get(cx, cy)
    }

    /// Bilinear sample with coordinates clamped to the image (replicate border).
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        debug_assert!(self.w > 0 && self.h > 0, "cannot sample an empty image");
        let x = x.clamp(0.0, (self.w - 1) as f32);
        let y = y.clamp(0.0, (self.h - 1) as f32);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;
        let x1 = (x0 + 1).min(self.w - 1);
        let y1 = (y0 + 1).min(self.h - 1);
        let p00 = self.get(x0, y0);
        let p10 = self.get(x1, y0);
        let p01 = self.get(x0, y1);
        let p11 = self.get(x1, y1);
        (1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11
    }

    /// Copy of the rectangle `[x0, x1) × [y0, y1)`.
    pub fn crop(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        assert!(x0 <= x1 && x1 <= self.w, "column range out of bounds");
        assert!(y0 <= y1 && y1 <= self.h, "row range out of bounds");
        let mut out = Self::new(x1 - x0, y1 - y0);
        for y in y0..y1 {
            out.row_mut(y - y0).copy_from_slice(&self.row(y)[x0..x1]);
        }
        out
    }

    /// Image repeated `times` times side by side.
    pub fn tile_horizontal(&self, times: usize) -> Self {
        let mut out = Self::new(self.w * times, self.h);
        for y in 0..self.h {
            let src = self.row(y);
            for chunk in out.row_mut(y).chunks_exact_mut(self.w.max(1)) {
                chunk.copy_from_slice(src);
            }
        }
        out
    }

    /// Multiply every sample by `k`.
    pub fn scale_values(&mut self, k: f32) {
        for v in &mut self.data {
            *v *= k;
        }
    }
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_sample_interpolates_and_clamps() {
        let img = ImageF32::from_fn(4, 3, |x, _| x as f32);
        assert!((img.sample_bilinear(1.25, 1.0) - 1.25).abs() < 1e-6);
        assert_eq!(img.sample_bilinear(-3.0, 0.0), 0.0);
        assert_eq!(img.sample_bilinear(10.0, 5.0), 3.0);
    }

    #[test]
    fn tiling_and_cropping_round_trip() {
        let img = ImageF32::from_fn(5, 2, |x, y| (x + 10 * y) as f32);
        let tiled = img.tile_horizontal(3);
        assert_eq!(tiled.w, 15);
        assert_eq!(tiled.get(7, 1), img.get(2, 1));
        assert_eq!(tiled.crop(5, 0, 10, 2), img);
    }
}
