//! Access to the equirectangular frame for a path index.

use crate::error::{Result, SelectorError};
use crate::image::io::load_color_image;
use crate::image::ColorImage;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Frames addressed by camera-path index.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn load_frame(&self, index: usize) -> Result<ColorImage>;
}

/// Image files of one directory, in file-name order.
#[derive(Clone, Debug)]
pub struct ImageDirectory {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl ImageDirectory {
    pub fn open(root: &Path) -> Result<Self> {
        let entries = fs::read_dir(root).map_err(|e| SelectorError::io(root, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SelectorError::io(root, e))?.path();
            if path.is_file() && has_image_extension(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(SelectorError::EmptyImageDirectory(root.to_path_buf()));
        }
        files.sort();
        debug!("found {} frames in {}", files.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

impl FrameSource for ImageDirectory {
    fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn load_frame(&self, index: usize) -> Result<ColorImage> {
        let path = self.files.get(index).ok_or(SelectorError::FrameNotFound {
            index,
            count: self.files.len(),
        })?;
        load_color_image(path)
    }
}

/// Frames already decoded in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFrames {
    frames: Vec<ColorImage>,
}

impl InMemoryFrames {
    pub fn new(frames: Vec<ColorImage>) -> Self {
        Self { frames }
    }
}

impl FrameSource for InMemoryFrames {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn load_frame(&self, index: usize) -> Result<ColorImage> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(SelectorError::FrameNotFound {
                index,
                count: self.frames.len(),
            })
    }
}
