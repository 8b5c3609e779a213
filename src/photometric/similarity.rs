//! Full-reference image similarity: SSIM and PSNR.
//!
//! Both operate on `[0, 1]` samples. SSIM uses a 7×7 uniform window with
//! mirrored borders, sample covariances, `K1 = 0.01`, `K2 = 0.03`, and
//! averages the SSIM map over the interior that the window fully covers. Colour
//! images are scored per channel and averaged.

use crate::error::{Result, SelectorError};
use crate::image::{ColorImage, ImageF32};

const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 1.0;

/// PSNR reported for identical images.
pub const PSNR_IDENTICAL: f64 = 100.0;

fn check_same_size(a: &ColorImage, b: &ColorImage, operation: &'static str) -> Result<()> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(SelectorError::ImageTooSmall {
            width: a.width().min(b.width()),
            height: a.height().min(b.height()),
            operation,
        });
    }
    Ok(())
}

/// Mean structural similarity of two equally sized colour images.
pub fn ssim(a: &ColorImage, b: &ColorImage) -> Result<f64> {
    check_same_size(a, b, "ssim on differently sized images")?;
    if a.width() < WINDOW || a.height() < WINDOW {
        return Err(SelectorError::ImageTooSmall {
            width: a.width(),
            height: a.height(),
            operation: "ssim",
        });
    }
    let total: f64 = a
        .channels
        .iter()
        .zip(&b.channels)
        .map(|(x, y)| ssim_channel(x, y))
        .sum();
    Ok(total / a.channels.len() as f64)
}

/// Peak signal-to-noise ratio over all channels, [`PSNR_IDENTICAL`] when equal.
pub fn psnr(a: &ColorImage, b: &ColorImage) -> Result<f64> {
    check_same_size(a, b, "psnr on differently sized images")?;
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for (x, y) in a.channels.iter().zip(&b.channels) {
        for (&p, &q) in x.data.iter().zip(&y.data) {
            let d = p as f64 - q as f64;
            sum += d * d;
        }
        count += x.data.len();
    }
    if count == 0 {
        return Err(SelectorError::ImageTooSmall {
            width: a.width(),
            height: a.height(),
            operation: "psnr",
        });
    }
    let mse = sum / count as f64;
    if mse == 0.0 {
        return Ok(PSNR_IDENTICAL);
    }
    Ok(20.0 * (DATA_RANGE / mse.sqrt()).log10())
}

fn ssim_channel(x: &ImageF32, y: &ImageF32) -> f64 {
    let (w, h) = (x.w, x.h);
    let xs: Vec<f64> = x.data.iter().map(|&v| v as f64).collect();
    let ys: Vec<f64> = y.data.iter().map(|&v| v as f64).collect();
    let product = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(p, q)| p * q).collect::<Vec<_>>();

    let ux = box_filter(&xs, w, h);
    let uy = box_filter(&ys, w, h);
    let uxx = box_filter(&product(&xs, &xs), w, h);
    let uyy = box_filter(&product(&ys, &ys), w, h);
    let uxy = box_filter(&product(&xs, &ys), w, h);

    let np = (WINDOW * WINDOW) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let pad = (WINDOW - 1) / 2;
    let mut sum = 0.0;
    let mut count = 0usize;
    for yy in pad..h - pad {
        for xx in pad..w - pad {
            let i = yy * w + xx;
            let vx = cov_norm * (uxx[i] - ux[i] * ux[i]);
            let vy = cov_norm * (uyy[i] - uy[i] * uy[i]);
            let vxy = cov_norm * (uxy[i] - ux[i] * uy[i]);
            let a1 = 2.0 * ux[i] * uy[i] + c1;
            let a2 = 2.0 * vxy + c2;
            let b1 = ux[i] * ux[i] + uy[i] * uy[i] + c1;
            let b2 = vx + vy + c2;
            sum += (a1 * a2) / (b1 * b2);
            count += 1;
        }
    }
    sum / count as f64
}

/// Separable `WINDOW`-wide mean filter with half-sample symmetric borders.
fn box_filter(src: &[f64], w: usize, h: usize) -> Vec<f64> {
    let r = (WINDOW / 2) as isize;
    let norm = 1.0 / WINDOW as f64;
    let mut tmp = vec![0.0; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0;
            for k in -r..=r {
                acc += row[reflect(x as isize + k, w)];
            }
            tmp[y * w + x] = acc * norm;
        }
    }
    let mut out = vec![0.0; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for k in -r..=r {
                acc += tmp[reflect(y as isize + k, h) * w + x];
            }
            out[y * w + x] = acc * norm;
        }
    }
    out
}

/// Mirror `i` into `[0, n)` as `d c b a | a b c d | d c b a`.
fn reflect(mut i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    i = i.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}
