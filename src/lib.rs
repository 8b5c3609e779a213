#![doc = include_str!("../README.md")]

// Pipeline stages
pub mod candidates;
pub mod evaluator;
pub mod geometry;
pub mod peaks;
pub mod photometric;
pub mod ranking;
pub mod selector;

// Data model, I/O and support
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flow;
pub mod image;
pub mod path;
pub mod pyramid;
pub mod types;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{load_config, RuntimeConfig, SelectorParams};
pub use crate::diagnostics::SelectionReport;
pub use crate::error::{Result, SelectorError};
pub use crate::path::{load_trajectory, CameraPath, CameraPose};
pub use crate::photometric::{FrameSource, ImageDirectory};
pub use crate::selector::CircleSelector;
pub use crate::types::{Interval, Metric, MetricRecord};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use circle_selector::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> circle_selector::Result<()> {
/// let path = load_trajectory(Path::new("scene/trajectory.txt"), 50.0)?;
/// let frames = ImageDirectory::open(Path::new("scene/frames"))?;
/// let mut selector = CircleSelector::new(SelectorParams::default());
/// let report = selector.select(&path, &frames)?;
/// println!("best interval {}", report.interval());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::config::SelectorParams;
    pub use crate::path::{load_trajectory, CameraPath};
    pub use crate::photometric::{FrameSource, ImageDirectory, InMemoryFrames};
    pub use crate::selector::CircleSelector;
    pub use crate::types::{Interval, Metric, MetricRecord};
}
