//! Value types passed between the selection stages.
//!
//! - `Interval`: a `[start, end)` index range over the camera path.
//! - `Metric`: enumerated metric identifiers.
//! - `MetricRecord`: the metrics accumulated for one interval.

use crate::error::{Result, SelectorError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Contiguous index range `[start, end)` over a camera path.
///
/// Serialized as a two-element array `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Interval {
    start: usize,
    end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(SelectorError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub(crate) fn from_sorted(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "interval bounds out of order");
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of poses between the endpoints (`end - start`).
    #[inline]
    pub fn span(&self) -> usize {
        self.end - self.start
    }

    pub fn is_admissible(&self, min_span: usize) -> bool {
        self.span() >= min_span
    }
}

impl TryFrom<(usize, usize)> for Interval {
    type Error = SelectorError;

    fn try_from((start, end): (usize, usize)) -> Result<Self> {
        Self::new(start, end)
    }
}

impl From<Interval> for (usize, usize) {
    fn from(interval: Interval) -> Self {
        (interval.start, interval.end)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// Metric identifiers stored in a [`MetricRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    FlatnessError,
    PerimeterError,
    EndpointError,
    PairwiseDistribution,
    Ssim,
    Psnr,
    SummedErrors,
    CombinedCvError,
}

impl Metric {
    /// Shape metrics produced by the geometric scorer.
    pub const GEOMETRIC: [Metric; 4] = [
        Metric::EndpointError,
        Metric::PerimeterError,
        Metric::FlatnessError,
        Metric::PairwiseDistribution,
    ];

    /// Image metrics produced by the photometric scorer.
    pub const PHOTOMETRIC: [Metric; 2] = [Metric::Ssim, Metric::Psnr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::FlatnessError => "flatness_error",
            Metric::PerimeterError => "perimeter_error",
            Metric::EndpointError => "endpoint_error",
            Metric::PairwiseDistribution => "pairwise_distribution",
            Metric::Ssim => "ssim",
            Metric::Psnr => "psnr",
            Metric::SummedErrors => "summed_errors",
            Metric::CombinedCvError => "combined_cv_error",
        }
    }

    pub fn is_geometric(&self) -> bool {
        Self::GEOMETRIC.contains(self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics accumulated for a single interval.
///
/// Later stages add entries to an existing record; setting a metric twice
/// overwrites the earlier value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub interval: Interval,
    #[serde(flatten)]
    metrics: BTreeMap<Metric, f64>,
}

impl MetricRecord {
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, value);
        self
    }

    #[inline]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    /// Value of `metric`, or `MissingMetric` naming this record's interval.
    pub fn require(&self, metric: Metric) -> Result<f64> {
        self.get(metric).ok_or(SelectorError::MissingMetric {
            interval: self.interval,
            metric,
        })
    }

    #[inline]
    pub fn set(&mut self, metric: Metric, value: f64) {
        self.metrics.insert(metric, value);
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.metrics.contains_key(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.metrics.iter().map(|(&m, &v)| (m, v))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Sum of the given metrics; fails on the first one that is absent.
    pub fn sum(&self, metrics: &[Metric]) -> Result<f64> {
        metrics
            .iter()
            .try_fold(0.0, |acc, &m| Ok(acc + self.require(m)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_reversed_bounds() {
        assert!(Interval::new(5, 5).is_err());
        assert!(Interval::new(6, 5).is_err());
        let iv = Interval::new(3, 20).unwrap();
        assert_eq!(iv.span(), 17);
        assert!(iv.is_admissible(10));
        assert!(!iv.is_admissible(18));
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let record = MetricRecord::new(Interval::new(0, 100).unwrap())
            .with(Metric::FlatnessError, 0.1);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"interval":[0,100],"flatness_error":0.1}"#);
    }

    #[test]
    fn record_deserialization_validates_interval() {
        let bad = r#"{"interval":[10,2],"ssim":0.5}"#;
        assert!(serde_json::from_str::<MetricRecord>(bad).is_err());
    }

    #[test]
    fn sum_reports_missing_metric() {
        let record = MetricRecord::new(Interval::new(1, 30).unwrap())
            .with(Metric::EndpointError, 0.25)
            .with(Metric::FlatnessError, 0.5);
        let total = record
            .sum(&[Metric::EndpointError, Metric::FlatnessError])
            .unwrap();
        assert_eq!(total, 0.75);
        match record.sum(&Metric::GEOMETRIC) {
            Err(SelectorError::MissingMetric { metric, .. }) => {
                assert_eq!(metric, Metric::PerimeterError)
            }
            other => panic!("expected missing metric, got {other:?}"),
        }
    }
}
