use crate::candidates::DEFAULT_MIN_SPAN;
use crate::peaks::PeakParams;
use crate::photometric::PhotometricParams;
use crate::types::Metric;
use serde::{Deserialize, Serialize};

/// Tunables of every selection stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorParams {
    /// Minimum `end - start` of a candidate interval.
    pub min_span: usize,
    /// Metrics computed by the geometric stage and summed for peak detection.
    pub geometric_metrics: Vec<Metric>,
    pub peaks: PeakParams,
    pub photometric: PhotometricParams,
    /// Worker threads for the geometric stage; `None` uses every CPU.
    pub workers: Option<usize>,
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            min_span: DEFAULT_MIN_SPAN,
            geometric_metrics: Metric::GEOMETRIC.to_vec(),
            peaks: PeakParams::default(),
            photometric: PhotometricParams::default(),
            workers: None,
        }
    }
}
