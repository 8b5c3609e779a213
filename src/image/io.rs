//! I/O helpers for colour images and JSON.
//!
//! - `load_color_image`: read a PNG/JPEG into a planar `ColorImage`.
//! - `save_color_image`: write a `ColorImage` to an 8-bit RGB file.
//! - `save_flow_image`: write a flow field as a hue/value colour image.
//! - `write_json_file` / `read_json_file`: serde round-trip through disk.
use super::ColorImage;
use crate::error::{Result, SelectorError};
use crate::flow::{flow_to_rgb, FlowField};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert it to RGB.
pub fn load_color_image(path: &Path) -> Result<ColorImage> {
    let img = image::open(path)
        .map_err(|e| SelectorError::ImageDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .into_rgb8();
    Ok(ColorImage::from_rgb8(&img))
}

/// Save a colour image, clamping samples to `[0, 1]`.
pub fn save_color_image(image: &ColorImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    image
        .to_rgb8()
        .save(path)
        .map_err(|e| SelectorError::ImageEncode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Save a colour-coded rendering of a flow field (see `flow::visualize`).
pub fn save_flow_image(flow: &FlowField, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    flow_to_rgb(flow)
        .save(path)
        .map_err(|e| SelectorError::ImageEncode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| SelectorError::json(path, e))?;
    fs::write(path, json).map_err(|e| SelectorError::io(path, e))
}

/// Read and deserialize a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| SelectorError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| SelectorError::json(path, e))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SelectorError::io(parent, e))?;
        }
    }
    Ok(())
}
