//! Planar three-channel image with `[0, 1]` samples in RGB order.

use super::f32::ImageF32;
use super::traits::{ImageView, ImageViewMut};
use image::{Rgb, RgbImage};

/// ITU-R BT.601 luma weights for R, G, B.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

#[derive(Clone, Debug, PartialEq)]
pub struct ColorImage {
    pub channels: [ImageF32; 3],
}

impl ColorImage {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            channels: [ImageF32::new(w, h), ImageF32::new(w, h), ImageF32::new(w, h)],
        }
    }

    /// Build from per-pixel RGB values in `[0, 1]`.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> [f32; 3]) -> Self {
        let mut out = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let rgb = f(x, y);
                for (c, chan) in out.channels.iter_mut().enumerate() {
                    chan.set(x, y, rgb[c]);
                }
            }
        }
        out
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.channels[0].w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.channels[0].h
    }

    pub fn from_rgb8(img: &RgbImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let mut out = Self::new(w, h);
        for (x, y, px) in img.enumerate_pixels() {
            for (c, chan) in out.channels.iter_mut().enumerate() {
                chan.set(x as usize, y as usize, px[c] as f32 / 255.0);
            }
        }
        out
    }

    pub fn to_rgb8(&self) -> RgbImage {
        let mut out = RgbImage::new(self.width() as u32, self.height() as u32);
        for y in 0..self.height() {
            let rows = self.channels.each_ref().map(|c| c.row(y));
            for x in 0..self.width() {
                let px = [0, 1, 2].map(|c| (rows[c][x] * 255.0).round().clamp(0.0, 255.0) as u8);
                out.put_pixel(x as u32, y as u32, Rgb(px));
            }
        }
        out
    }

    /// Single-channel intensity `0.299 R + 0.587 G + 0.114 B`.
    pub fn to_gray(&self) -> ImageF32 {
        let mut out = ImageF32::new(self.width(), self.height());
        for y in 0..self.height() {
            let [r, g, b] = self.channels.each_ref().map(|c| c.row(y));
            for (x, dst) in out.row_mut(y).iter_mut().enumerate() {
                *dst = LUMA_WEIGHTS[0] * r[x] + LUMA_WEIGHTS[1] * g[x] + LUMA_WEIGHTS[2] * b[x];
            }
        }
        out
    }

    /// Apply `f` to each channel independently.
    pub fn map_channels(&self, mut f: impl FnMut(&ImageF32) -> ImageF32) -> Self {
        Self {
            channels: self.channels.each_ref().map(|c| f(c)),
        }
    }

    pub fn crop(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        self.map_channels(|c| c.crop(x0, y0, x1, y1))
    }

    pub fn tile_horizontal(&self, times: usize) -> Self {
        self.map_channels(|c| c.tile_horizontal(times))
    }
}
