//! Error surface over `(start, end)` and its local maxima.
//!
//! Every scored interval contributes `1 / Σ metrics` at `[start, end]`, so low
//! combined error shows up as a bright spot. Unscored cells stay zero.
//! Peak detection:
//!
//! 1. a cell is a candidate if it equals the maximum of its
//!    `(2·min_distance + 1)²` neighbourhood (clipped at the border) and
//!    exceeds `max(surface_min, threshold_rel · surface_max)`;
//! 2. candidates closer than `min_distance` to the border are dropped when
//!    `exclude_border` is set;
//! 3. candidates are visited by descending value and any candidate within
//!    Chebyshev distance `min_distance` of an accepted one is discarded.

use crate::error::{Result, SelectorError};
use crate::types::{Interval, Metric, MetricRecord};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    pub min_distance: usize,
    pub threshold_rel: f64,
    pub exclude_border: bool,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            min_distance: 10,
            threshold_rel: 0.5,
            exclude_border: true,
        }
    }
}

/// Dense `size × size` surface, row = start index, column = end index.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorSurface {
    size: usize,
    values: Vec<f64>,
}

impl ErrorSurface {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Fill the surface from `records`, storing each combined error back into
    /// its record as `summed_errors`.
    ///
    /// `size` defaults to the largest endpoint index plus one.
    pub fn from_records(
        records: &mut [MetricRecord],
        metrics: &[Metric],
        size: Option<usize>,
    ) -> Result<Self> {
        let inferred = records.iter().map(|r| r.interval.end() + 1).max().unwrap_or(0);
        let size = size.unwrap_or(inferred);
        let mut surface = Self::zeros(size);
        for record in records.iter_mut() {
            let interval = record.interval;
            if interval.end() >= size {
                return Err(SelectorError::IntervalOutOfRange {
                    interval,
                    len: size,
                });
            }
            let combined = record.sum(metrics)?;
            record.set(Metric::SummedErrors, combined);
            let value = if combined == 0.0 {
                f64::MAX
            } else {
                1.0 / combined
            };
            surface.set(interval.start(), interval.end(), value);
        }
        Ok(surface)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.size + col] = value;
    }

    fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Coordinates `(row, col)` of the accepted local maxima, strongest first.
    pub fn local_maxima(&self, params: &PeakParams) -> Vec<(usize, usize)> {
        let n = self.size;
        if n == 0 {
            return Vec::new();
        }
        let (lo, hi) = self.min_max();
        if lo == hi {
            return Vec::new();
        }
        let threshold = lo.max(params.threshold_rel * hi);
        let neighbourhood_max = max_filter(&self.values, n, params.min_distance);
        let border = if params.exclude_border {
            params.min_distance
        } else {
            0
        };

        let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
        if n > 2 * border {
            for r in border..n - border {
                for c in border..n - border {
                    let v = self.get(r, c);
                    if v == neighbourhood_max[r * n + c] && v > threshold {
                        candidates.push((r, c, v));
                    }
                }
            }
        }
        // stable, so ties keep row-major order
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

        let spacing = params.min_distance;
        let mut accepted: Vec<(usize, usize)> = Vec::new();
        for (r, c, _) in candidates {
            let crowded = accepted
                .iter()
                .any(|&(ar, ac)| r.abs_diff(ar) <= spacing && c.abs_diff(ac) <= spacing);
            if !crowded {
                accepted.push((r, c));
            }
        }
        accepted
    }
}

/// Maximum over a `(2r+1)²` window clipped to the `n × n` grid.
fn max_filter(values: &[f64], n: usize, r: usize) -> Vec<f64> {
    let mut rows = vec![f64::NEG_INFINITY; n * n];
    for y in 0..n {
        let row = &values[y * n..(y + 1) * n];
        for x in 0..n {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(n - 1);
            rows[y * n + x] = row[lo..=hi].iter().copied().fold(f64::NEG_INFINITY, f64::max);
        }
    }
    let mut out = vec![f64::NEG_INFINITY; n * n];
    for y in 0..n {
        let lo = y.saturating_sub(r);
        let hi = (y + r).min(n - 1);
        for x in 0..n {
            out[y * n + x] = (lo..=hi)
                .map(|k| rows[k * n + x])
                .fold(f64::NEG_INFINITY, f64::max);
        }
    }
    out
}

/// Records at local maxima of the inverted combined error, in input order.
///
/// Every record gets `summed_errors` set, peak or not.
pub fn select_peaks(
    records: &mut [MetricRecord],
    metrics: &[Metric],
    params: &PeakParams,
    size: Option<usize>,
) -> Result<Vec<MetricRecord>> {
    let surface = ErrorSurface::from_records(records, metrics, size)?;
    let peaks: HashSet<Interval> = surface
        .local_maxima(params)
        .into_iter()
        .filter_map(|(r, c)| Interval::new(r, c).ok())
        .collect();
    debug!(
        "{} peaks on a {}x{} surface from {} records",
        peaks.len(),
        surface.size(),
        surface.size(),
        records.len()
    );
    Ok(records
        .iter()
        .filter(|r| peaks.contains(&r.interval))
        .cloned()
        .collect())
}
