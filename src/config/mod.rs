//! JSON configuration for the selector binaries.
//!
//! ```json
//! {
//!   "trajectory": "scene/trajectory.txt",
//!   "images": "scene/frames",
//!   "fps": 50,
//!   "output": { "report_json": "out/report.json", "cache_json": "out/cache.json" },
//!   "params": { "min_span": 10, "peaks": { "min_distance": 10 } }
//! }
//! ```
//!
//! Everything except `trajectory` and `images` may be omitted.

pub mod params;

pub use params::SelectorParams;

use crate::error::Result;
use crate::image::io::read_json_file;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Frame rate of the source video when a config does not name one.
pub const DEFAULT_FPS: f64 = 50.0;

fn default_fps() -> f64 {
    DEFAULT_FPS
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub report_json: Option<PathBuf>,
    pub cache_json: Option<PathBuf>,
    pub debug_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub trajectory: PathBuf,
    pub images: PathBuf,
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub params: SelectorParams,
}

impl RuntimeConfig {
    /// Resolve relative paths against `base`, normally the config's directory.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        fix(&mut self.trajectory);
        fix(&mut self.images);
        for p in [
            &mut self.output.report_json,
            &mut self.output.cache_json,
            &mut self.output.debug_dir,
        ]
        .into_iter()
        .flatten()
        {
            fix(p);
        }
        self
    }
}

/// Read a [`RuntimeConfig`]; relative paths are taken from the config's
/// directory.
pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let config: RuntimeConfig = read_json_file(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.resolve_relative_to(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metric;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"trajectory": "t.txt", "images": "frames"}"#).unwrap();
        assert_eq!(config.fps, DEFAULT_FPS);
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.params, SelectorParams::default());
        assert_eq!(config.params.photometric.padding_px, 180);
        assert_eq!(config.params.peaks.min_distance, 10);
    }

    #[test]
    fn nested_overrides_keep_other_defaults() {
        let json = r#"{
            "trajectory": "t.txt",
            "images": "frames",
            "params": {
                "min_span": 25,
                "geometric_metrics": ["flatness_error", "endpoint_error"],
                "photometric": { "flow": { "finest_scale": 1 } },
                "workers": 2
            }
        }"#;
        let config: RuntimeConfig = serde_json::from_str(json).unwrap();
        let p = &config.params;
        assert_eq!(p.min_span, 25);
        assert_eq!(
            p.geometric_metrics,
            vec![Metric::FlatnessError, Metric::EndpointError]
        );
        assert_eq!(p.photometric.flow.finest_scale, 1);
        assert_eq!(p.photometric.flow.patch_size, 8);
        assert_eq!(p.photometric.output_scale_percent, 50);
        assert_eq!(p.workers, Some(2));
    }

    #[test]
    fn load_resolves_paths_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selector.json");
        std::fs::write(
            &path,
            r#"{"trajectory": "t.txt", "images": "/abs/frames",
                "output": {"cache_json": "out/cache.json"}}"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.trajectory, dir.path().join("t.txt"));
        assert_eq!(config.images, PathBuf::from("/abs/frames"));
        assert_eq!(
            config.output.cache_json,
            Some(dir.path().join("out/cache.json"))
        );
    }
}
