//! View-synthesis consistency between the two endpoint frames of an interval.
//!
//! For a closed sweep the first and last frame see the same scene from almost
//! the same place. The scorer cuts the forward-facing hemisphere out of both
//! panoramas, predicts each endpoint from the other with dense optical flow
//! and measures how well the predictions match:
//!
//! 1. heading = mean look-at angle of both endpoints towards the interval
//!    centroid;
//! 2. padded hemisphere slices at `output_scale_percent` and, converted to
//!    intensity, at `flow_scale_percent`;
//! 3. flow start→end and end→start at flow scale, upsampled to output scale;
//! 4. backward warp of each output slice through its flow;
//! 5. padding and polar rows removed, SSIM/PSNR averaged over both directions.

pub mod equirect;
pub mod similarity;
pub mod source;

pub use source::{FrameSource, ImageDirectory, InMemoryFrames};

use crate::error::{Result, SelectorError};
use crate::flow::{warp_backward, DenseFlow, DisFlow, DisFlowParams, FlowField};
use crate::geometry::centroid;
use crate::image::io::{save_color_image, save_flow_image};
use crate::image::resize::{resize_area, scaled_dims};
use crate::image::{ColorImage, ImageF32};
use crate::path::CameraPath;
use crate::types::{Interval, Metric, MetricRecord};
use equirect::{crop_poles, slice_equirect, unpad};
use log::{debug, info};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use similarity::{psnr, ssim};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotometricParams {
    /// Extra columns on each side of the hemisphere slice, in source pixels.
    pub padding_px: usize,
    /// Resolution at which predictions are compared, percent of source.
    pub output_scale_percent: u32,
    /// Resolution at which flow is estimated, percent of source.
    pub flow_scale_percent: u32,
    /// Fraction of the slice height dropped at each pole.
    pub pole_crop_fraction: f64,
    pub flow: DisFlowParams,
}

impl Default for PhotometricParams {
    fn default() -> Self {
        Self {
            padding_px: 180,
            output_scale_percent: 50,
            flow_scale_percent: 25,
            pole_crop_fraction: 0.05,
            flow: DisFlowParams::default(),
        }
    }
}

impl PhotometricParams {
    /// Padding columns remaining after downscaling to output resolution.
    pub fn output_padding(&self) -> usize {
        self.padding_px * self.output_scale_percent as usize / 100
    }

    fn flow_upscale(&self) -> f32 {
        self.output_scale_percent as f32 / self.flow_scale_percent.max(1) as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotometricScore {
    pub ssim: f64,
    pub psnr: f64,
    pub look_at_angle: f64,
}

/// Heading of the camera at `index` towards `target`, `atan2(x, z)` in the
/// camera frame.
fn heading(path: &CameraPath, index: usize, target: &Vector3<f64>) -> f64 {
    let to_target = target - path.positions()[index];
    let local = path.orientations()[index] * to_target;
    local.x.atan2(local.z)
}

/// Mean heading of both endpoints towards the centroid of `interval`.
///
/// The vector rotated into each camera frame points from the camera to the
/// centroid. Rotating `camera - centroid` instead would centre the hemisphere
/// slices π away from these.
pub fn look_at_angle(path: &CameraPath, interval: Interval) -> Result<f64> {
    let center = centroid(path.positions_in(interval)?);
    let a = heading(path, interval.start(), &center);
    let b = heading(path, interval.end(), &center);
    Ok(0.5 * (a + b))
}

/// Output-resolution hemisphere and its flow-resolution intensity image.
struct PreparedSlice {
    output: ColorImage,
    flow_gray: ImageF32,
}

/// Serial photometric scorer; owns the flow estimator and its scratch state.
pub struct PhotometricScorer<F = DisFlow> {
    params: PhotometricParams,
    flow: F,
    debug_dir: Option<PathBuf>,
}

impl PhotometricScorer<DisFlow> {
    pub fn new(params: PhotometricParams) -> Self {
        let flow = DisFlow::new(params.flow.clone());
        Self::with_flow(params, flow)
    }
}

impl<F: DenseFlow> PhotometricScorer<F> {
    pub fn with_flow(params: PhotometricParams, flow: F) -> Self {
        Self {
            params,
            flow,
            debug_dir: None,
        }
    }

    /// Write slices and predictions of every scored interval below `dir`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    pub fn params(&self) -> &PhotometricParams {
        &self.params
    }

    pub fn score(
        &mut self,
        path: &CameraPath,
        frames: &dyn FrameSource,
        interval: Interval,
    ) -> Result<PhotometricScore> {
        path.check_interval(interval)?;
        let angle = look_at_angle(path, interval)?;
        let start = self.prepare(&frames.load_frame(interval.start())?, angle)?;
        let end = self.prepare(&frames.load_frame(interval.end())?, angle)?;

        let ratio = self.params.flow_upscale();
        let (ow, oh) = (start.output.width(), start.output.height());
        let forward = self
            .flow
            .calc(&start.flow_gray, &end.flow_gray)?
            .resized(ow, oh, ratio);
        let backward = self
            .flow
            .calc(&end.flow_gray, &start.flow_gray)?
            .resized(ow, oh, ratio);

        let predicted_end = start.output.map_channels(|c| warp_backward(c, &forward));
        let predicted_start = end.output.map_channels(|c| warp_backward(c, &backward));

        let real_start = self.finish(&start.output)?;
        let real_end = self.finish(&end.output)?;
        let predicted_start = self.finish(&predicted_start)?;
        let predicted_end = self.finish(&predicted_end)?;

        let (real_start, predicted_start) = common_extent(real_start, predicted_start);
        let (real_end, predicted_end) = common_extent(real_end, predicted_end);

        if let Some(dir) = &self.debug_dir {
            let dir = dir.join(format!("interval_{}_{}", interval.start(), interval.end()));
            let pad = self.params.output_padding();
            write_debug_images(
                &dir,
                &[
                    ("start.png", &real_start),
                    ("end.png", &real_end),
                    ("predicted_start.png", &predicted_start),
                    ("predicted_end.png", &predicted_end),
                ],
                &[
                    ("forward_flow.png", &forward.crop(pad, 0, ow - pad, oh)),
                    ("backward_flow.png", &backward.crop(pad, 0, ow - pad, oh)),
                ],
            )?;
        }

        let score = PhotometricScore {
            ssim: 0.5 * (ssim(&real_start, &predicted_start)? + ssim(&real_end, &predicted_end)?),
            psnr: 0.5 * (psnr(&real_start, &predicted_start)? + psnr(&real_end, &predicted_end)?),
            look_at_angle: angle,
        };
        debug!(
            "interval {interval}: heading {:.3} rad ssim {:.4} psnr {:.2}",
            angle, score.ssim, score.psnr
        );
        Ok(score)
    }

    /// Add `ssim` and `psnr` to an existing record.
    pub fn score_into(
        &mut self,
        path: &CameraPath,
        frames: &dyn FrameSource,
        record: &mut MetricRecord,
    ) -> Result<()> {
        let score = self.score(path, frames, record.interval)?;
        record.set(Metric::Ssim, score.ssim);
        record.set(Metric::Psnr, score.psnr);
        Ok(())
    }

    /// Score every record in turn on the calling thread.
    pub fn score_candidates(
        &mut self,
        path: &CameraPath,
        frames: &dyn FrameSource,
        records: &mut [MetricRecord],
    ) -> Result<()> {
        let total = records.len();
        for (k, record) in records.iter_mut().enumerate() {
            let t0 = Instant::now();
            self.score_into(path, frames, record)?;
            info!(
                "photometric {}/{total} interval {} in {:.0} ms",
                k + 1,
                record.interval,
                t0.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(())
    }

    fn prepare(&self, frame: &ColorImage, angle: f64) -> Result<PreparedSlice> {
        let slice = slice_equirect(frame, angle, self.params.padding_px)?;
        let (sw, sh) = (slice.width(), slice.height());
        let (ow, oh) = scaled_dims(sw, sh, self.params.output_scale_percent);
        let (fw, fh) = scaled_dims(sw, sh, self.params.flow_scale_percent);
        if ow == 0 || oh == 0 || fw == 0 || fh == 0 {
            return Err(SelectorError::ImageTooSmall {
                width: sw,
                height: sh,
                operation: "downscaling the hemisphere slice",
            });
        }
        let output = slice.map_channels(|c| resize_area(c, ow, oh));
        let flow_gray = slice.map_channels(|c| resize_area(c, fw, fh)).to_gray();
        Ok(PreparedSlice { output, flow_gray })
    }

    fn finish(&self, image: &ColorImage) -> Result<ColorImage> {
        let unpadded = unpad(image, self.params.output_padding())?;
        crop_poles(&unpadded, self.params.pole_crop_fraction)
    }
}

fn common_extent(a: ColorImage, b: ColorImage) -> (ColorImage, ColorImage) {
    let w = a.width().min(b.width());
    let h = a.height().min(b.height());
    let fit = |img: ColorImage| {
        if img.width() == w && img.height() == h {
            img
        } else {
            img.crop(0, 0, w, h)
        }
    };
    (fit(a), fit(b))
}

fn write_debug_images(
    dir: &Path,
    images: &[(&str, &ColorImage)],
    flows: &[(&str, &FlowField)],
) -> Result<()> {
    for (name, image) in images {
        save_color_image(image, &dir.join(name))?;
    }
    for (name, flow) in flows {
        save_flow_image(flow, &dir.join(name))?;
    }
    debug!("wrote debug slices and flows to {}", dir.display());
    Ok(())
}
