//! Candidate interval enumeration.

use crate::error::{Result, SelectorError};
use crate::types::Interval;

/// Default minimum `end - start` for a candidate interval.
pub const DEFAULT_MIN_SPAN: usize = 10;

/// Every `(i, j)` with `i + min_span <= j < len`, in row-major order.
///
/// `min_span` is raised to 1 so that no empty interval is produced.
pub fn enumerate_candidates(len: usize, min_span: usize) -> Vec<Interval> {
    let min_span = min_span.max(1);
    let mut out = Vec::with_capacity(candidate_count(len, min_span));
    for start in 0..len {
        for end in (start + min_span)..len {
            out.push(Interval::from_sorted(start, end));
        }
    }
    out
}

/// Number of intervals `enumerate_candidates(len, min_span)` yields.
pub fn candidate_count(len: usize, min_span: usize) -> usize {
    let min_span = min_span.max(1);
    if len <= min_span {
        return 0;
    }
    let m = len - min_span;
    m * (m + 1) / 2
}

/// Fails with `SpanTooShort` unless `interval` spans at least `min_span` poses.
pub fn check_admissible(interval: Interval, min_span: usize) -> Result<()> {
    if !interval.is_admissible(min_span) {
        return Err(SelectorError::SpanTooShort {
            interval,
            span: interval.span(),
            min: min_span,
        });
    }
    Ok(())
}
