use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall time of a single selection stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Per-stage timings of one selector run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Run `f` and record its wall time under `label`.
    pub fn measure<T>(&mut self, label: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.push(label, start.elapsed().as_secs_f64() * 1000.0);
        out
    }

    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_records_in_call_order() {
        let mut timings = TimingBreakdown::default();
        let v = timings.measure("first", || 3);
        timings.measure("second", || ());
        assert_eq!(v, 3);
        let labels: Vec<_> = timings.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
        assert!(timings.stage_ms("first").unwrap() >= 0.0);
        assert!(timings.stage_ms("missing").is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let mut timings = TimingBreakdown::with_total(2.5);
        timings.push("peaks", 1.0);
        let json = serde_json::to_string(&timings).unwrap();
        assert_eq!(
            json,
            r#"{"totalMs":2.5,"stages":[{"label":"peaks","elapsedMs":1.0}]}"#
        );
    }
}
