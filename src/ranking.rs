//! Final ranking by photometric consistency.
//!
//! `combined_cv_error = ssim + psnr / 100`; higher is better. PSNR is divided
//! by 100 to bring it roughly to the SSIM range.

use crate::error::{Result, SelectorError};
use crate::types::{Metric, MetricRecord};
use log::info;

/// Combined photometric score of one record.
pub fn combined_cv_error(record: &MetricRecord) -> Result<f64> {
    let ssim = record.require(Metric::Ssim)?;
    let psnr = record.require(Metric::Psnr)?;
    Ok(ssim + psnr / 100.0)
}

/// Store `combined_cv_error` in every record and sort best first.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_intervals(records: &mut [MetricRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(SelectorError::NoCandidates);
    }
    for record in records.iter_mut() {
        let combined = combined_cv_error(record)?;
        record.set(Metric::CombinedCvError, combined);
    }
    records.sort_by(|a, b| {
        let ka = a.get(Metric::CombinedCvError).unwrap_or(f64::NEG_INFINITY);
        let kb = b.get(Metric::CombinedCvError).unwrap_or(f64::NEG_INFINITY);
        kb.total_cmp(&ka)
    });
    Ok(())
}

/// Rank `records` and return the best one.
pub fn find_best_interval(records: &mut [MetricRecord]) -> Result<MetricRecord> {
    rank_intervals(records)?;
    let best = records[0].clone();
    info!(
        "best interval {} with combined_cv_error {:.4}",
        best.interval,
        best.get(Metric::CombinedCvError).unwrap_or_default()
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Interval;

    fn record(start: usize, end: usize, ssim: f64, psnr: f64) -> MetricRecord {
        MetricRecord::new(Interval::new(start, end).unwrap())
            .with(Metric::Ssim, ssim)
            .with(Metric::Psnr, psnr)
    }

    #[test]
    fn psnr_weight_can_outrank_ssim() {
        let mut records = vec![record(0, 40, 0.95, 20.0), record(5, 60, 0.9, 30.0)];
        let best = find_best_interval(&mut records).unwrap();
        assert_eq!(best.interval, Interval::new(5, 60).unwrap());
        assert!((best.get(Metric::CombinedCvError).unwrap() - 1.2).abs() < 1e-12);
        assert!((records[1].get(Metric::CombinedCvError).unwrap() - 1.15).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut records = vec![
            record(0, 20, 0.5, 10.0),
            record(1, 30, 0.8, 40.0),
            record(2, 40, 0.5, 10.0),
        ];
        rank_intervals(&mut records).unwrap();
        let starts: Vec<usize> = records.iter().map(|r| r.interval.start()).collect();
        assert_eq!(starts, vec![1, 0, 2]);
    }

    #[test]
    fn missing_photometric_metric_is_fatal() {
        let mut records = vec![
            record(0, 20, 0.5, 10.0),
            MetricRecord::new(Interval::new(3, 30).unwrap()).with(Metric::Ssim, 0.7),
        ];
        let err = rank_intervals(&mut records).unwrap_err();
        assert!(matches!(
            err,
            SelectorError::MissingMetric {
                metric: Metric::Psnr,
                ..
            }
        ));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            find_best_interval(&mut []),
            Err(SelectorError::NoCandidates)
        ));
    }
}
