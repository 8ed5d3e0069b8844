//! In-memory pyramid source
//!
//! This backend holds every level as a decoded RGBA buffer. It backs the
//! image-file source and doubles as the synthetic-pyramid backend for tests
//! and embedders that already hold pixel data.

use image::imageops;
use image::RgbaImage;

use crate::errors::{ExtractError, ExtractResult};

use super::source::PyramidSource;

/// Pyramid source over explicit in-memory levels
///
/// Downsample factors are derived from the width ratio between level 0 and
/// each level, so the supplied levels must shrink (or stay equal) as the
/// level index grows.
pub struct MemoryPyramidSource {
    levels: Vec<RgbaImage>,
    downsamples: Vec<f64>,
}

impl MemoryPyramidSource {
    /// Create a source from explicit levels, finest first
    ///
    /// # Arguments
    /// * `levels` - Decoded planes, index 0 being full resolution
    ///
    /// # Returns
    /// A new source, or `SourceOpenFailed` if no levels were supplied, a
    /// level is empty, or the downsample factors are not non-decreasing
    pub fn new(levels: Vec<RgbaImage>) -> ExtractResult<Self> {
        let base = levels.first().ok_or_else(|| {
            ExtractError::SourceOpenFailed("pyramid has no levels".to_string())
        })?;
        let base_width = base.width() as f64;

        let mut downsamples = Vec::with_capacity(levels.len());
        for (index, level) in levels.iter().enumerate() {
            if level.width() == 0 || level.height() == 0 {
                return Err(ExtractError::SourceOpenFailed(format!(
                    "pyramid level {} is empty",
                    index
                )));
            }
            let factor = base_width / level.width() as f64;
            if factor < 1.0 || downsamples.last().is_some_and(|prev| factor < *prev) {
                return Err(ExtractError::SourceOpenFailed(format!(
                    "pyramid level {} has out-of-order downsample factor {}",
                    index, factor
                )));
            }
            downsamples.push(factor);
        }

        Ok(MemoryPyramidSource { levels, downsamples })
    }

    /// Build a pyramid from a base plane and a list of downsample factors
    ///
    /// Each reduced level is produced by resampling the base with a
    /// triangle filter. Factors must start at 1.0 and be non-decreasing.
    pub fn from_base(base: RgbaImage, downsamples: &[f64]) -> ExtractResult<Self> {
        let mut levels = Vec::with_capacity(downsamples.len());
        for factor in downsamples {
            if *factor <= 1.0 {
                levels.push(base.clone());
            } else {
                let width = (base.width() as f64 / factor).max(1.0) as u32;
                let height = (base.height() as f64 / factor).max(1.0) as u32;
                levels.push(imageops::resize(&base, width, height, imageops::FilterType::Triangle));
            }
        }
        Self::new(levels)
    }
}

impl PyramidSource for MemoryPyramidSource {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level_dimensions(&self, level: usize) -> ExtractResult<(u32, u32)> {
        let plane = self.levels.get(level).ok_or(ExtractError::InvalidLevel(level))?;
        Ok((plane.width(), plane.height()))
    }

    fn level_downsample(&self, level: usize) -> ExtractResult<f64> {
        self.downsamples
            .get(level)
            .copied()
            .ok_or(ExtractError::InvalidLevel(level))
    }

    fn read_region(&self, origin: (u32, u32), level: usize, size: (u32, u32)) -> ExtractResult<RgbaImage> {
        let plane = self.levels.get(level).ok_or(ExtractError::InvalidLevel(level))?;
        let downsample = self.downsamples[level];

        // Origins are in base-level coordinates regardless of target level
        let level_x = (origin.0 as f64 / downsample) as u32;
        let level_y = (origin.1 as f64 / downsample) as u32;
        let (width, height) = size;

        if width == 0 || height == 0 {
            return Err(ExtractError::RegionReadFailed(format!(
                "empty region {}x{} requested at level {}",
                width, height, level
            )));
        }
        if level_x.checked_add(width).map_or(true, |end| end > plane.width())
            || level_y.checked_add(height).map_or(true, |end| end > plane.height())
        {
            return Err(ExtractError::RegionReadFailed(format!(
                "region {}x{} at ({}, {}) exceeds level {} extent {}x{}",
                width,
                height,
                level_x,
                level_y,
                level,
                plane.width(),
                plane.height()
            )));
        }

        Ok(imageops::crop_imm(plane, level_x, level_y, width, height).to_image())
    }
}
