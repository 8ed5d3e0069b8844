//! Pyramid source trait and backend factory
//!
//! This module defines the capability interface that all pyramid backends
//! must implement, and a factory that selects a backend from the file
//! extension so new formats can be added in one place.

use std::path::Path;

use image::RgbaImage;
use log::{debug, error, info};

use crate::errors::{ExtractError, ExtractResult};

use super::image_backend::ImagePyramidSource;

/// Capability interface over a multi-resolution image store
///
/// Level 0 is full resolution with downsample factor 1.0; higher indices are
/// progressively coarser copies of the same content with non-decreasing
/// downsample factors. The last level is the cheapest plane and is the one
/// used for region detection. Backend resources (file handles, decoded
/// planes) are released when the source is dropped, so one pipeline run can
/// hold a source for exactly its own scope.
pub trait PyramidSource {
    /// Number of pyramid levels (always at least 1)
    fn level_count(&self) -> usize;

    /// Pixel dimensions (width, height) of the given level
    fn level_dimensions(&self, level: usize) -> ExtractResult<(u32, u32)>;

    /// Downsample factor of the given level relative to level 0
    fn level_downsample(&self, level: usize) -> ExtractResult<f64>;

    /// Read a pixel region from the given level
    ///
    /// # Arguments
    /// * `origin` - Top-left corner of the region in base-level coordinates
    /// * `level` - Pyramid level to read from
    /// * `size` - Region size in the target level's own pixel units
    ///
    /// # Returns
    /// The decoded pixels, or an error if the request exceeds the level
    /// extent or the underlying read fails
    fn read_region(&self, origin: (u32, u32), level: usize, size: (u32, u32)) -> ExtractResult<RgbaImage>;

    /// Pixel dimensions of the full-resolution plane
    fn base_dimensions(&self) -> ExtractResult<(u32, u32)> {
        self.level_dimensions(0)
    }
}

/// Factory for creating pyramid sources from file paths
///
/// Examines the file extension and opens the appropriate backend. New
/// pyramidal formats only need a new match arm here.
pub struct PyramidSourceFactory;

impl PyramidSourceFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        PyramidSourceFactory
    }

    /// Open a pyramid source for the given file path
    ///
    /// # Arguments
    /// * `file_path` - Path to the pyramidal image file
    ///
    /// # Returns
    /// A boxed source for the file, or `SourceOpenFailed` if the format is
    /// unsupported or the file cannot be opened
    pub fn open(&self, file_path: &str) -> ExtractResult<Box<dyn PyramidSource>> {
        let extension = Path::new(file_path)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("")
            .to_lowercase();

        debug!("Determining pyramid backend for file extension: {}", extension);

        match extension.as_str() {
            "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff" => {
                info!("Using image-backed pyramid source for {}", file_path);
                Ok(Box::new(ImagePyramidSource::open(file_path)?))
            }
            // Add more backends here as needed
            _ => {
                error!("Unsupported pyramid source format: {}", extension);
                Err(ExtractError::SourceOpenFailed(format!(
                    "unsupported file format: {:?}",
                    extension
                )))
            }
        }
    }
}

impl Default for PyramidSourceFactory {
    fn default() -> Self {
        Self::new()
    }
}
