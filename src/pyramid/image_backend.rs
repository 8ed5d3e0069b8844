//! Image-file backed pyramid source
//!
//! Opens any raster format supported by the `image` crate and synthesizes
//! the reduced levels in memory by repeated 4x downsampling, until the
//! coarsest level fits a small thumbnail budget. Purpose-built pyramidal
//! containers that ship precomputed levels should get their own backend
//! instead of going through this one.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{debug, info};

use crate::errors::{ExtractError, ExtractResult};

use super::memory::MemoryPyramidSource;
use super::source::PyramidSource;

/// Scale step between consecutive synthesized levels
const LEVEL_SCALE_STEP: u32 = 4;

/// Largest dimension allowed for the coarsest (detection) level
const COARSE_TARGET_DIM: u32 = 256;

/// Pyramid source over a flat raster file
///
/// The file is decoded once at open time; reduced levels are derived from
/// the base plane and held alongside it for the lifetime of the source.
pub struct ImagePyramidSource {
    inner: MemoryPyramidSource,
}

impl ImagePyramidSource {
    /// Open a raster file and build its level stack
    ///
    /// # Arguments
    /// * `file_path` - Path to the image file
    ///
    /// # Returns
    /// A new source, or `SourceOpenFailed` if the file cannot be decoded
    pub fn open(file_path: &str) -> ExtractResult<Self> {
        info!("Opening image-backed pyramid source: {}", file_path);

        let base = image::open(file_path)
            .map_err(|e| ExtractError::SourceOpenFailed(format!("{}: {}", file_path, e)))?
            .to_rgba8();

        let levels = build_levels(base);
        debug!("Synthesized {} pyramid level(s)", levels.len());

        Ok(ImagePyramidSource {
            inner: MemoryPyramidSource::new(levels)?,
        })
    }
}

impl PyramidSource for ImagePyramidSource {
    fn level_count(&self) -> usize {
        self.inner.level_count()
    }

    fn level_dimensions(&self, level: usize) -> ExtractResult<(u32, u32)> {
        self.inner.level_dimensions(level)
    }

    fn level_downsample(&self, level: usize) -> ExtractResult<f64> {
        self.inner.level_downsample(level)
    }

    fn read_region(&self, origin: (u32, u32), level: usize, size: (u32, u32)) -> ExtractResult<RgbaImage> {
        self.inner.read_region(origin, level, size)
    }
}

/// Downsample the base plane into a level stack, finest first
fn build_levels(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base];

    loop {
        let prev = levels.last().map(|l| l.dimensions());
        let Some((width, height)) = prev else { break };
        if width.max(height) <= COARSE_TARGET_DIM {
            break;
        }
        let next_width = width / LEVEL_SCALE_STEP;
        let next_height = height / LEVEL_SCALE_STEP;
        if next_width == 0 || next_height == 0 {
            break;
        }
        let reduced = imageops::resize(&levels[levels.len() - 1], next_width, next_height, FilterType::Triangle);
        levels.push(reduced);
    }

    levels
}
