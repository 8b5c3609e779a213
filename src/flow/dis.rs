//! Patch-based inverse-search dense flow.
//!
//! Coarse-to-fine over a Gaussian pyramid. At every scale:
//!
//! 1. A grid of square patches (`patch_size`, spaced `patch_stride`) is laid
//!    over the source level. Each patch starts from the flow propagated from
//!    the coarser scale, sampled at its centre.
//! 2. Each patch displacement is refined with inverse-compositional
//!    Gauss-Newton on mean-normalised intensities. The template Hessian is
//!    built once per patch. A refinement that increases the patch SSD is
//!    discarded.
//! 3. Patches are densified: every pixel takes the average of the covering
//!    patch displacements, weighted by `1 / max(1, |residual|)` with the
//!    residual measured in 8-bit intensity units.
//!
//! Processing stops at `finest_scale`; the result is bilinearly upsampled to
//! the input resolution.

use super::{DenseFlow, FlowField};
use crate::error::{Result, SelectorError};
use crate::image::ImageF32;
use crate::pyramid::{Pyramid, PyramidOptions};
use log::debug;
use serde::{Deserialize, Serialize};

const SINGULAR_DET: f32 = 1e-9;
const CONVERGED_SQ: f32 = 1e-4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisFlowParams {
    /// Side length of the square patches in pixels.
    pub patch_size: usize,
    /// Distance between neighbouring patch origins.
    pub patch_stride: usize,
    /// Gauss-Newton iterations per patch and scale.
    pub iterations: usize,
    /// Pyramid level at which the search stops (0 = full resolution).
    pub finest_scale: usize,
}

impl Default for DisFlowParams {
    fn default() -> Self {
        Self {
            patch_size: 8,
            patch_stride: 4,
            iterations: 16,
            finest_scale: 2,
        }
    }
}

/// Dense inverse-search flow estimator.
#[derive(Clone, Debug, Default)]
pub struct DisFlow {
    params: DisFlowParams,
    patches: Vec<PatchFlow>,
    weights: Vec<f32>,
}

#[derive(Clone, Copy, Debug)]
struct PatchFlow {
    x0: usize,
    y0: usize,
    u: f32,
    v: f32,
}

impl DisFlow {
    pub fn new(params: DisFlowParams) -> Self {
        Self {
            params,
            patches: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn params(&self) -> &DisFlowParams {
        &self.params
    }

    /// Coarsest and finest pyramid levels searched for a `w × h` input.
    fn scale_range(&self, w: usize, h: usize) -> (usize, usize) {
        let patch = self.params.patch_size.max(1);
        let available = Pyramid::levels_for(w, h, patch) - 1;
        let target = (w.max(h) as f32 / (4.0 * patch as f32)).log2().round();
        let coarsest = (target.max(0.0) as usize).min(available);
        let finest = self.params.finest_scale.min(coarsest);
        (coarsest.max(finest), finest)
    }

    fn refine_level(&mut self, i0: &ImageF32, i1: &ImageF32, init: &FlowField) -> FlowField {
        let (w, h) = (i0.w, i0.h);
        let ps = self.params.patch_size.max(1).min(w).min(h);
        let stride = self.params.patch_stride.max(1);
        let (gx, gy) = central_gradients(i0);

        self.patches.clear();
        for y0 in patch_origins(h, ps, stride) {
            for x0 in patch_origins(w, ps, stride) {
                let cx = (x0 + ps / 2).min(w - 1);
                let cy = (y0 + ps / 2).min(h - 1);
                let start = (init.dx.get(cx, cy), init.dy.get(cx, cy));
                let (u, v) = self.search_patch(i0, i1, &gx, &gy, x0, y0, ps, start);
                self.patches.push(PatchFlow { x0, y0, u, v });
            }
        }

        self.densify(i0, i1, init, ps)
    }

    #[allow(clippy::too_many_arguments)]
    fn search_patch(
        &self,
        i0: &ImageF32,
        i1: &ImageF32,
        gx: &ImageF32,
        gy: &ImageF32,
        x0: usize,
        y0: usize,
        ps: usize,
        start: (f32, f32),
    ) -> (f32, f32) {
        let n = (ps * ps) as f32;
        let mut template = Vec::with_capacity(ps * ps);
        let mut grads = Vec::with_capacity(ps * ps);
        for y in y0..y0 + ps {
            for x in x0..x0 + ps {
                template.push(i0.get(x, y));
                grads.push((gx.get(x, y), gy.get(x, y)));
            }
        }
        let t_mean = template.iter().sum::<f32>() / n;
        let gx_mean = grads.iter().map(|g| g.0).sum::<f32>() / n;
        let gy_mean = grads.iter().map(|g| g.1).sum::<f32>() / n;
        for g in &mut grads {
            g.0 -= gx_mean;
            g.1 -= gy_mean;
        }

        let (mut h00, mut h01, mut h11) = (0.0f32, 0.0f32, 0.0f32);
        for &(a, b) in &grads {
            h00 += a * a;
            h01 += a * b;
            h11 += b * b;
        }
        let det = h00 * h11 - h01 * h01;
        if det.abs() < SINGULAR_DET {
            return start;
        }
        let inv_det = 1.0 / det;

        let residuals = |u: f32, v: f32, out: &mut Vec<f32>| {
            out.clear();
            for y in y0..y0 + ps {
                for x in x0..x0 + ps {
                    out.push(i1.sample_bilinear(x as f32 + u, y as f32 + v));
                }
            }
            let mean = out.iter().sum::<f32>() / n;
            for (r, &t) in out.iter_mut().zip(&template) {
                *r = (*r - mean) - (t - t_mean);
            }
        };
        let ssd = |r: &[f32]| r.iter().map(|e| e * e).sum::<f32>();

        let mut err = Vec::with_capacity(ps * ps);
        residuals(start.0, start.1, &mut err);
        let start_ssd = ssd(&err);

        let (mut u, mut v) = start;
        for _ in 0..self.params.iterations {
            let (mut b0, mut b1) = (0.0f32, 0.0f32);
            for (&(a, b), &e) in grads.iter().zip(&err) {
                b0 += a * e;
                b1 += b * e;
            }
            let du = inv_det * (h11 * b0 - h01 * b1);
            let dv = inv_det * (h00 * b1 - h01 * b0);
            u -= du;
            v -= dv;
            residuals(u, v, &mut err);
            if du * du + dv * dv < CONVERGED_SQ {
                break;
            }
        }

        if !(u.is_finite() && v.is_finite()) || ssd(&err) > start_ssd {
            start
        } else {
            (u, v)
        }
    }

    fn densify(&mut self, i0: &ImageF32, i1: &ImageF32, init: &FlowField, ps: usize) -> FlowField {
        let (w, h) = (i0.w, i0.h);
        let mut out = FlowField::zeros(w, h);
        self.weights.clear();
        self.weights.resize(w * h, 0.0);

        for p in &self.patches {
            for y in p.y0..p.y0 + ps {
                for x in p.x0..p.x0 + ps {
                    let warped = i1.sample_bilinear(x as f32 + p.u, y as f32 + p.v);
                    let diff = 255.0 * (warped - i0.get(x, y)).abs();
                    let wt = 1.0 / diff.max(1.0);
                    let idx = y * w + x;
                    out.dx.data[idx] += wt * p.u;
                    out.dy.data[idx] += wt * p.v;
                    self.weights[idx] += wt;
                }
            }
        }

        for idx in 0..w * h {
            let wt = self.weights[idx];
            if wt > 0.0 {
                out.dx.data[idx] /= wt;
                out.dy.data[idx] /= wt;
            } else {
                out.dx.data[idx] = init.dx.data[idx];
                out.dy.data[idx] = init.dy.data[idx];
            }
        }
        out
    }
}

impl DenseFlow for DisFlow {
    fn calc(&mut self, from: &ImageF32, to: &ImageF32) -> Result<FlowField> {
        if from.w != to.w || from.h != to.h {
            return Err(SelectorError::ImageTooSmall {
                width: to.w.min(from.w),
                height: to.h.min(from.h),
                operation: "dense flow between differently sized images",
            });
        }
        if from.w < 2 || from.h < 2 {
            return Err(SelectorError::ImageTooSmall {
                width: from.w,
                height: from.h,
                operation: "dense flow",
            });
        }

        let (coarsest, finest) = self.scale_range(from.w, from.h);
        let options = PyramidOptions::new(coarsest + 1);
        let pyr0 = Pyramid::build_f32(from.clone(), options);
        let pyr1 = Pyramid::build_f32(to.clone(), options);
        debug!(
            "dense flow {}x{}: scales {coarsest}..={finest}",
            from.w, from.h
        );

        let top = &pyr0.levels[coarsest];
        let mut flow = FlowField::zeros(top.w, top.h);
        for level in (finest..=coarsest).rev() {
            let i0 = &pyr0.levels[level];
            let i1 = &pyr1.levels[level];
            if flow.width() != i0.w || flow.height() != i0.h {
                flow = flow.upscaled_to(i0.w, i0.h);
            }
            flow = self.refine_level(i0, i1, &flow);
        }

        if finest > 0 {
            flow = flow.upscaled_to(from.w, from.h);
        }
        Ok(flow)
    }
}

/// Patch origins along an axis of length `len`, always covering the far edge.
fn patch_origins(len: usize, ps: usize, stride: usize) -> Vec<usize> {
    let last = len.saturating_sub(ps);
    let mut origins: Vec<usize> = (0..=last).step_by(stride).collect();
    if origins.last() != Some(&last) {
        origins.push(last);
    }
    origins
}

/// Central-difference gradients with replicated borders.
fn central_gradients(img: &ImageF32) -> (ImageF32, ImageF32) {
    let gx = ImageF32::from_fn(img.w, img.h, |x, y| {
        let (x, y) = (x as isize, y as isize);
        0.5 * (img.get_clamped(x + 1, y) - img.get_clamped(x - 1, y))
    });
    let gy = ImageF32::from_fn(img.w, img.h, |x, y| {
        let (x, y) = (x as isize, y as isize);
        0.5 * (img.get_clamped(x, y + 1) - img.get_clamped(x, y - 1))
    });
    (gx, gy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(w: usize, h: usize, shift_x: f32) -> ImageF32 {
        ImageF32::from_fn(w, h, |x, y| {
            let xf = x as f32 - shift_x;
            let yf = y as f32;
            0.5 + 0.25 * (xf * 0.21).sin() * (yf * 0.17).cos() + 0.2 * (xf * 0.05 + yf * 0.08).sin()
        })
    }

    #[test]
    fn patch_origins_cover_far_edge() {
        assert_eq!(patch_origins(20, 8, 4), vec![0, 4, 8, 12]);
        assert_eq!(patch_origins(19, 8, 4), vec![0, 4, 8, 11]);
        assert_eq!(patch_origins(8, 8, 4), vec![0]);
    }

    #[test]
    fn identical_frames_have_near_zero_flow() {
        let img = textured(96, 64, 0.0);
        let mut dis = DisFlow::new(DisFlowParams::default());
        let flow = dis.calc(&img, &img).unwrap();
        assert_eq!((flow.width(), flow.height()), (96, 64));
        let (mx, my) = flow.mean();
        assert!(mx.abs() < 0.05 && my.abs() < 0.05, "mean=({mx}, {my})");
    }

    #[test]
    fn recovers_horizontal_shift() {
        let shift = 3.0;
        let from = textured(128, 96, 0.0);
        let to = textured(128, 96, shift);
        let mut dis = DisFlow::new(DisFlowParams {
            finest_scale: 0,
            ..DisFlowParams::default()
        });
        let flow = dis.calc(&from, &to).unwrap();
        // ignore the border band where content enters the frame
        let mut sum = 0.0;
        let mut count = 0.0;
        for y in 16..80 {
            for x in 16..112 {
                sum += flow.dx.get(x, y);
                count += 1.0;
            }
        }
        let mean = sum / count;
        assert!((mean - shift).abs() < 0.5, "mean dx={mean}");
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut dis = DisFlow::default();
        let a = ImageF32::new(16, 16);
        let b = ImageF32::new(17, 16);
        assert!(dis.calc(&a, &b).is_err());
    }
}
