use crate::diagnostics::TimingBreakdown;
use crate::types::{Interval, Metric, MetricRecord};
use serde::{Deserialize, Serialize};

/// How many intervals survived each stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCounts {
    pub poses: usize,
    pub candidates: usize,
    pub peaks: usize,
}

/// Result of a full selector run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionReport {
    pub selected: MetricRecord,
    /// Source video frames at the selected start and end pose.
    pub frame_range: (usize, usize),
    /// Photometrically scored candidates, best first.
    pub ranked: Vec<MetricRecord>,
    pub counts: CandidateCounts,
    /// Scored peaks were read from the cache instead of recomputed.
    pub from_cache: bool,
    pub timings: TimingBreakdown,
}

impl SelectionReport {
    pub fn interval(&self) -> Interval {
        self.selected.interval
    }

    /// Human-readable summary, one line per ranked candidate.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "selected interval {} (frames {}..{}), {} poses, {} candidates, {} peaks{}\n",
            self.selected.interval,
            self.frame_range.0,
            self.frame_range.1,
            self.counts.poses,
            self.counts.candidates,
            self.counts.peaks,
            if self.from_cache { " [cached]" } else { "" },
        );
        for (rank, record) in self.ranked.iter().enumerate() {
            let value = |m: Metric| {
                record
                    .get(m)
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_else(|| "-".to_string())
            };
            out.push_str(&format!(
                "  #{:<3} {:<12} combined={} ssim={} psnr={} summed={}\n",
                rank + 1,
                record.interval.to_string(),
                value(Metric::CombinedCvError),
                value(Metric::Ssim),
                value(Metric::Psnr),
                value(Metric::SummedErrors),
            ));
        }
        for stage in &self.timings.stages {
            out.push_str(&format!("  {:<12} {:>10.1} ms\n", stage.label, stage.elapsed_ms));
        }
        out.push_str(&format!("  {:<12} {:>10.1} ms\n", "total", self.timings.total_ms));
        out
    }
}
