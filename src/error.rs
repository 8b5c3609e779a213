//! Error type shared by every stage of the selector.

use crate::types::{Interval, Metric};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("trajectory {0} contains no poses")]
    EmptyTrajectory(PathBuf),
    #[error("trajectory {path} line {line}: {reason}")]
    MalformedTrajectory {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("interval {interval} is outside a path of {len} poses")]
    IntervalOutOfRange { interval: Interval, len: usize },
    #[error("interval {interval} spans {span} poses, need at least {min}")]
    SpanTooShort {
        interval: Interval,
        span: usize,
        min: usize,
    },
    #[error("geometric metrics undefined for {interval}: {reason}")]
    Domain { interval: Interval, reason: String },
    #[error("interval start {start} must be smaller than end {end}")]
    InvalidInterval { start: usize, end: usize },
    #[error("metric `{metric}` missing for interval {interval}")]
    MissingMetric { interval: Interval, metric: Metric },
    #[error("no candidate intervals left to rank")]
    NoCandidates,
    #[error("frame {index} not found: image source holds {count} frames")]
    FrameNotFound { index: usize, count: usize },
    #[error("no images found in {0}")]
    EmptyImageDirectory(PathBuf),
    #[error("failed to decode image {path}: {reason}")]
    ImageDecode { path: PathBuf, reason: String },
    #[error("failed to write image {path}: {reason}")]
    ImageEncode { path: PathBuf, reason: String },
    #[error("image of {width}x{height} too small for {operation}")]
    ImageTooSmall {
        width: usize,
        height: usize,
        operation: &'static str,
    },
    #[error("worker pool failed: {0}")]
    WorkerPool(String),
}

impl SelectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectorError>;
