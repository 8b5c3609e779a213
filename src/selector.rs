//! End-to-end interval selection.
//!
//! Stages, in order:
//!
//! 1. enumerate every admissible `(start, end)` pair;
//! 2. score the shape metrics of all candidates in parallel;
//! 3. keep the local maxima of the inverted summed shape error;
//! 4. score the remaining peaks photometrically, one at a time;
//! 5. rank by `ssim + psnr / 100` and report the best interval.
//!
//! Stages 1–4 are skipped when a metric cache with scored peaks exists. A
//! fresh run writes that cache after stage 4.

use crate::cache::MetricCache;
use crate::candidates::{check_admissible, enumerate_candidates};
use crate::config::SelectorParams;
use crate::diagnostics::{CandidateCounts, SelectionReport, TimingBreakdown};
use crate::error::{Result, SelectorError};
use crate::evaluator::ParallelEvaluator;
use crate::flow::{DenseFlow, DisFlow};
use crate::geometry::GeometricScorer;
use crate::path::CameraPath;
use crate::peaks::select_peaks;
use crate::photometric::{FrameSource, PhotometricScorer};
use crate::ranking::rank_intervals;
use crate::types::{Interval, MetricRecord};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

pub struct CircleSelector<F = DisFlow> {
    params: SelectorParams,
    photometric: PhotometricScorer<F>,
    cache: Option<MetricCache>,
}

impl CircleSelector<DisFlow> {
    pub fn new(params: SelectorParams) -> Self {
        let photometric = PhotometricScorer::new(params.photometric.clone());
        Self::from_parts(params, photometric)
    }
}

impl<F: DenseFlow> CircleSelector<F> {
    /// Selector using a custom flow estimator for the photometric stage.
    pub fn with_flow(params: SelectorParams, flow: F) -> Self {
        let photometric = PhotometricScorer::with_flow(params.photometric.clone(), flow);
        Self::from_parts(params, photometric)
    }

    fn from_parts(params: SelectorParams, photometric: PhotometricScorer<F>) -> Self {
        Self {
            params,
            photometric,
            cache: None,
        }
    }

    /// Read scored peaks from, and write them to, `path`.
    pub fn with_cache(mut self, path: Option<PathBuf>) -> Self {
        self.cache = path.map(MetricCache::new);
        self
    }

    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.photometric = self.photometric.with_debug_dir(dir);
        self
    }

    pub fn params(&self) -> &SelectorParams {
        &self.params
    }

    /// Shape metrics of every admissible interval of `path`.
    pub fn score_geometry(&self, path: &CameraPath) -> Result<Vec<MetricRecord>> {
        let candidates = enumerate_candidates(path.len(), self.params.min_span);
        self.score_geometry_of(path, &candidates)
    }

    fn score_geometry_of(
        &self,
        path: &CameraPath,
        candidates: &[Interval],
    ) -> Result<Vec<MetricRecord>> {
        let scorer = GeometricScorer::new(&self.params.geometric_metrics);
        ParallelEvaluator::new(scorer, self.params.workers).evaluate(path, candidates)
    }

    /// Local maxima of the inverted summed shape error, in input order.
    pub fn find_peaks(
        &self,
        records: &mut [MetricRecord],
        path_len: usize,
    ) -> Result<Vec<MetricRecord>> {
        select_peaks(
            records,
            &self.params.geometric_metrics,
            &self.params.peaks,
            Some(path_len),
        )
    }

    /// Shape and photometric metrics of a single admissible interval.
    pub fn score_interval(
        &mut self,
        path: &CameraPath,
        frames: &dyn FrameSource,
        interval: Interval,
    ) -> Result<MetricRecord> {
        check_admissible(interval, self.params.min_span)?;
        let scorer = GeometricScorer::new(&self.params.geometric_metrics);
        let mut record = scorer.score(path, interval)?;
        self.photometric.score_into(path, frames, &mut record)?;
        Ok(record)
    }

    /// Run every stage and return the report for the best interval.
    pub fn select(
        &mut self,
        path: &CameraPath,
        frames: &dyn FrameSource,
    ) -> Result<SelectionReport> {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        let mut counts = CandidateCounts {
            poses: path.len(),
            ..CandidateCounts::default()
        };
        info!(
            "selecting from {} poses, {} frames",
            path.len(),
            frames.frame_count()
        );

        let cached = match &self.cache {
            Some(cache) => timings.measure("cache_load", || cache.load())?,
            None => None,
        };
        let from_cache = cached.is_some();

        let mut ranked = match cached {
            Some(records) => {
                for record in &records {
                    path.check_interval(record.interval)?;
                    check_admissible(record.interval, self.params.min_span)?;
                }
                counts.peaks = records.len();
                records
            }
            None => {
                let candidates = timings.measure("enumerate", || {
                    enumerate_candidates(path.len(), self.params.min_span)
                });
                counts.candidates = candidates.len();
                if candidates.is_empty() {
                    warn!(
                        "path of {} poses has no interval spanning {} poses",
                        path.len(),
                        self.params.min_span
                    );
                    return Err(SelectorError::NoCandidates);
                }

                let mut records =
                    timings.measure("geometric", || self.score_geometry_of(path, &candidates))?;
                let mut peaks =
                    timings.measure("peaks", || self.find_peaks(&mut records, path.len()))?;
                counts.peaks = peaks.len();
                info!(
                    "{} of {} candidates kept as peaks",
                    peaks.len(),
                    candidates.len()
                );

                let photometric = &mut self.photometric;
                timings.measure("photometric", || {
                    photometric.score_candidates(path, frames, &mut peaks)
                })?;

                if let Some(cache) = &self.cache {
                    timings.measure("cache_store", || cache.store(&peaks))?;
                }
                peaks
            }
        };

        timings.measure("rank", || rank_intervals(&mut ranked))?;
        let selected = ranked[0].clone();
        let frame_range = path.frame_range(selected.interval)?;
        timings.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!("selection finished in {:.1} ms", timings.total_ms);

        Ok(SelectionReport {
            selected,
            frame_range,
            ranked,
            counts,
            from_cache,
            timings,
        })
    }
}
