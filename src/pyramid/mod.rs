//! Intensity pyramid with separable blur and 2× decimation.
//!
//! Level 0 is the input image; each further level halves both dimensions
//! (rounding up). For the first `blur_levels` decimations the separable filter
//! (Gaussian by default) is applied while decimating. Border samples clamp to
//! the image extents.

pub mod options;

pub use options::{PyramidOptions, SeparableFilter, StaticSeparableFilter, GAUSSIAN_5TAP};

use crate::image::{ImageF32, ImageView, ImageViewMut};

#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    pub levels: Vec<ImageF32>,
}

impl Pyramid {
    pub fn build_f32(image: ImageF32, options: PyramidOptions) -> Self {
        assert!(options.levels >= 1, "pyramid requires at least one level");
        let mut levels = Vec::with_capacity(options.levels);
        levels.push(image);
        if options.levels == 1 {
            return Self { levels };
        }

        let blur_limit = options.blur_levels.min(options.levels.saturating_sub(1));
        let mut horiz_cache = Vec::new();
        let mut cached_rows = Vec::new();
        for lvl in 1..options.levels {
            let prev = &levels[lvl - 1];
            let (nw, nh) = (prev.w.div_ceil(2), prev.h.div_ceil(2));
            let mut down = ImageF32::new(nw, nh);
            if lvl <= blur_limit {
                downsample_with_filter(
                    prev,
                    &mut down,
                    options.filter,
                    &mut horiz_cache,
                    &mut cached_rows,
                );
            } else {
                downsample_without_filter(prev, &mut down);
            }
            levels.push(down);
        }

        Self { levels }
    }

    /// Number of 2× levels that keep both sides at least `min_side` pixels.
    pub fn levels_for(w: usize, h: usize, min_side: usize) -> usize {
        let mut levels = 1;
        let (mut w, mut h) = (w, h);
        while w.div_ceil(2) >= min_side && h.div_ceil(2) >= min_side {
            w = w.div_ceil(2);
            h = h.div_ceil(2);
            levels += 1;
        }
        levels
    }
}

fn downsample_without_filter(src: &ImageF32, dst: &mut ImageF32) {
    if src.w == 0 || src.h == 0 {
        return;
    }
    let max_sx = src.w.saturating_sub(1);
    let max_sy = src.h.saturating_sub(1);
    let mut sy = 0usize;
    for y in 0..dst.h {
        let src_row = src.row(sy.min(max_sy));
        let dst_row = dst.row_mut(y);
        let mut sx = 0usize;
        for dst_px in dst_row {
            *dst_px = src_row[sx.min(max_sx)];
            sx = sx.saturating_add(2);
        }
        sy = sy.saturating_add(2);
    }
}

fn downsample_with_filter(
    src: &ImageF32,
    dst: &mut ImageF32,
    filter: StaticSeparableFilter,
    horiz_cache: &mut Vec<f32>,
    cached_rows: &mut Vec<isize>,
) {
    if src.w == 0 || src.h == 0 || dst.w == 0 || dst.h == 0 {
        return;
    }
    let taps = filter.taps();
    assert!(
        !taps.is_empty(),
        "filter must provide at least one tap for downsampling"
    );
    let radius = taps.len() / 2;
    let taps_len = taps.len();
    let cache_width = dst.w;

    horiz_cache.clear();
    horiz_cache.resize(cache_width * taps_len, 0.0);
    cached_rows.clear();
    cached_rows.resize(taps_len, -1);

    for y in 0..dst.h {
        let center_sy = (y * 2) as isize;
        for ky in 0..taps_len {
            let offset = ky as isize - radius as isize;
            let sy = clamp_index(center_sy + offset, src.h) as isize;
            if cached_rows[ky] != sy {
                let src_row = src.row(sy as usize);
                let cache_row = &mut horiz_cache[ky * cache_width..(ky + 1) * cache_width];
                filter_row_downsample(src_row, cache_row, taps, radius);
                cached_rows[ky] = sy;
            }
        }
        let dst_row = dst.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (ky, &tap) in taps.iter().enumerate() {
                acc += tap * horiz_cache[ky * cache_width + x];
            }
            *dst_px = acc;
        }
    }
}

fn filter_row_downsample(row: &[f32], out: &mut [f32], taps: &[f32], radius: usize) {
    if row.is_empty() || out.is_empty() {
        return;
    }
    let max_x = row.len();
    let mut sx = 0isize;
    for dst_px in out {
        let mut acc = 0.0f32;
        for (k, &tap) in taps.iter().enumerate() {
            let offset = k as isize - radius as isize;
            let idx = clamp_index(sx + offset, max_x);
            acc += tap * row[idx];
        }
        *dst_px = acc;
        sx = sx.saturating_add(2);
    }
}

fn clamp_index(idx: isize, upper: usize) -> usize {
    if upper == 0 {
        return 0;
    }
    if idx < 0 {
        0
    } else if (idx as usize) >= upper {
        upper - 1
    } else {
        idx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_sizes_round_up() {
        let img = ImageF32::new(33, 20);
        let pyr = Pyramid::build_f32(img, PyramidOptions::new(3).with_blur_levels(2));
        let dims: Vec<_> = pyr.levels.iter().map(|l| (l.w, l.h)).collect();
        assert_eq!(dims, vec![(33, 20), (17, 10), (9, 5)]);
    }

    #[test]
    fn blur_preserves_constant_images() {
        let img = ImageF32::from_fn(16, 16, |_, _| 0.4);
        let pyr = Pyramid::build_f32(img, PyramidOptions::new(3).with_blur_levels(3));
        for level in &pyr.levels {
            assert!(level.data.iter().all(|v| (v - 0.4).abs() < 1e-6));
        }
    }

    #[test]
    fn level_count_respects_min_side() {
        assert_eq!(Pyramid::levels_for(64, 32, 8), 3);
        assert_eq!(Pyramid::levels_for(5, 5, 8), 1);
    }
}
