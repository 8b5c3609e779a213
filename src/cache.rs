//! On-disk cache of scored intervals.
//!
//! Flat JSON list of records, each `{"interval": [i, j], "<metric>": value}`.
//! Floats are written in shortest round-trip form and parsed with
//! `float_roundtrip`, so a reload reproduces every value bit for bit.

use crate::error::Result;
use crate::image::io::{read_json_file, write_json_file};
use crate::types::MetricRecord;
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct MetricCache {
    path: PathBuf,
}

impl MetricCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Cached records, or `None` when no cache file exists yet.
    pub fn load(&self) -> Result<Option<Vec<MetricRecord>>> {
        if !self.exists() {
            debug!("no cache at {}", self.path.display());
            return Ok(None);
        }
        let records = read_records(&self.path)?;
        info!(
            "loaded {} cached records from {}",
            records.len(),
            self.path.display()
        );
        Ok(Some(records))
    }

    pub fn store(&self, records: &[MetricRecord]) -> Result<()> {
        write_records(&self.path, records)?;
        info!("cached {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

pub fn read_records(path: &Path) -> Result<Vec<MetricRecord>> {
    read_json_file(path)
}

pub fn write_records(path: &Path, records: &[MetricRecord]) -> Result<()> {
    write_json_file(path, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectorError;
    use crate::types::{Interval, Metric};

    #[test]
    fn round_trip_is_bit_identical() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetricCache::new(dir.path().join("nested").join("cache.json"));
        assert!(cache.load().unwrap().is_none());

        let records = vec![
            MetricRecord::new(Interval::new(3, 41).unwrap())
                .with(Metric::Ssim, 0.1 + 0.2)
                .with(Metric::Psnr, 27.123456789012345)
                .with(Metric::SummedErrors, 1.0 / 3.0),
            MetricRecord::new(Interval::new(7, 19).unwrap())
                .with(Metric::FlatnessError, 1e-300)
                .with(Metric::EndpointError, f64::MAX),
        ];
        cache.store(&records).unwrap();
        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded, records);
        for (a, b) in loaded.iter().zip(&records) {
            for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn malformed_cache_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"interval": [5, 2]}]"#).unwrap();
        match read_records(&path) {
            Err(SelectorError::Json { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected JSON error, got {other:?}"),
        }
    }
}
