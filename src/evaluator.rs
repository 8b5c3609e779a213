//! Data-parallel geometric scoring of the candidate set.
//!
//! The candidate list is cut into one contiguous chunk per worker. Each chunk
//! is scored independently against the shared, read-only camera path and the
//! partial results are concatenated in chunk order. A failure in any chunk
//! fails the whole evaluation.

use crate::error::{Result, SelectorError};
use crate::geometry::GeometricScorer;
use crate::path::CameraPath;
use crate::types::{Interval, MetricRecord};
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct ParallelEvaluator {
    scorer: GeometricScorer,
    workers: usize,
}

impl ParallelEvaluator {
    /// `workers = None` uses one worker per available CPU.
    pub fn new(scorer: GeometricScorer, workers: Option<usize>) -> Self {
        let workers = workers
            .filter(|&w| w > 0)
            .unwrap_or_else(default_workers);
        Self { scorer, workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Static chunk length used for `total` candidates.
    pub fn chunk_len(&self, total: usize) -> usize {
        total.div_ceil(self.workers).max(1)
    }

    pub fn evaluate(&self, path: &CameraPath, candidates: &[Interval]) -> Result<Vec<MetricRecord>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let chunk_len = self.chunk_len(candidates.len());
        let chunks: Vec<&[Interval]> = candidates.chunks(chunk_len).collect();
        let start = Instant::now();
        debug!(
            "scoring {} candidates in {} chunks of <= {chunk_len} on {} workers",
            candidates.len(),
            chunks.len(),
            self.workers
        );

        let partials = self.run_chunks(path, &chunks)?;

        let mut records = Vec::with_capacity(candidates.len());
        for part in partials {
            records.extend(part);
        }
        debug!(
            "geometric scoring finished in {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(records)
    }

    fn run_chunks(
        &self,
        path: &CameraPath,
        chunks: &[&[Interval]],
    ) -> Result<Vec<Vec<MetricRecord>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| SelectorError::WorkerPool(e.to_string()))?;
        pool.install(|| {
            chunks
                .par_iter()
                .map(|chunk| score_chunk(&self.scorer, path, chunk))
                .collect()
        })
    }
}

fn score_chunk(
    scorer: &GeometricScorer,
    path: &CameraPath,
    chunk: &[Interval],
) -> Result<Vec<MetricRecord>> {
    chunk
        .iter()
        .map(|&interval| scorer.score(path, interval))
        .collect()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::enumerate_candidates;
    use nalgebra::Vector3;

    fn wobbly_path(n: usize) -> CameraPath {
        let pts = (0..n)
            .map(|k| {
                let t = k as f64 * 0.1;
                Vector3::new(t.cos(), 0.05 * (3.0 * t).sin(), t.sin())
            })
            .collect();
        CameraPath::from_positions(pts)
    }

    #[test]
    fn chunking_covers_every_candidate() {
        let eval = ParallelEvaluator::new(GeometricScorer::default(), Some(4));
        assert_eq!(eval.chunk_len(10), 3);
        assert_eq!(eval.chunk_len(2), 1);
        assert_eq!(eval.chunk_len(0), 1);
    }

    #[test]
    fn parallel_matches_serial_scoring() {
        let path = wobbly_path(45);
        let candidates = enumerate_candidates(path.len(), 10);
        let scorer = GeometricScorer::default();
        let serial: Vec<_> = candidates
            .iter()
            .map(|&iv| scorer.score(&path, iv).unwrap())
            .collect();
        let parallel = ParallelEvaluator::new(scorer, Some(3))
            .evaluate(&path, &candidates)
            .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn out_of_range_candidate_fails_the_stage() {
        let path = wobbly_path(20);
        let mut candidates = enumerate_candidates(path.len(), 10);
        candidates.push(Interval::new(5, 25).unwrap());
        let err = ParallelEvaluator::new(GeometricScorer::default(), Some(2))
            .evaluate(&path, &candidates)
            .unwrap_err();
        assert!(matches!(err, SelectorError::IntervalOutOfRange { .. }));
    }
}
