//! Reporting data model of a selector run.
//!
//! `SelectionReport` is returned by the selector and written as the JSON
//! report: the chosen interval, the ranked candidates and a
//! `TimingBreakdown` of every stage that ran.

pub mod report;
pub mod timing;

pub use report::{CandidateCounts, SelectionReport};
pub use timing::{StageTiming, TimingBreakdown};
