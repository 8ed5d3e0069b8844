//! Largest-component bounding box extraction
//!
//! Border following (Suzuki-Abe, via `imageproc::contours::find_contours`)
//! yields one contour per foreground border. Only outer borders are
//! considered, so holes inside the specimen are ignored, and the single
//! contour enclosing the largest area wins. Disjoint secondary specimens
//! are deliberately dropped: one region per image, noise stays out.

use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use log::{debug, info};

use crate::coordinate::BoundingBox;
use crate::errors::{ExtractError, ExtractResult};
use crate::pyramid::PyramidSource;
use crate::utils::logger::Logger;

use super::mask::binarize;

/// Foreground threshold carried over from the legacy extraction heuristic
pub const DEFAULT_FOREGROUND_THRESHOLD: u8 = 10;

/// Tunable detection parameters
///
/// The defaults reproduce the legacy heuristic: near-black border, fixed
/// threshold of 10, single largest component.
#[derive(Debug, Clone, Copy)]
pub struct DetectorParams {
    /// Intensity above which a pixel counts as foreground
    pub foreground_threshold: u8,
}

impl Default for DetectorParams {
    fn default() -> Self {
        DetectorParams {
            foreground_threshold: DEFAULT_FOREGROUND_THRESHOLD,
        }
    }
}

/// Detector for the dominant specimen region
pub struct RoiDetector<'a> {
    /// Logger for recording operations
    logger: &'a Logger,
    /// Detection parameters
    params: DetectorParams,
}

impl<'a> RoiDetector<'a> {
    /// Create a new detector
    ///
    /// # Arguments
    /// * `logger` - Logger for recording operations
    /// * `params` - Detection parameters
    pub fn new(logger: &'a Logger, params: DetectorParams) -> Self {
        RoiDetector { logger, params }
    }

    /// Detect the specimen bounding box on the coarsest pyramid level
    ///
    /// Reads the full plane of the last level, binarizes it, and extracts
    /// the largest outer component. The coarsest level is the smallest
    /// plane in the pyramid, so this read is cheap regardless of the
    /// base-resolution image size.
    ///
    /// # Arguments
    /// * `source` - Pyramid source to read the detection plane from
    ///
    /// # Returns
    /// The detection level index and the bounding box in that level's
    /// pixel space, or `NoRegionDetected` if no foreground was found
    pub fn detect(&self, source: &dyn PyramidSource) -> ExtractResult<(usize, BoundingBox)> {
        let level = source.level_count() - 1;
        let dimensions = source.level_dimensions(level)?;
        info!("Detecting region on level {} ({}x{})", level, dimensions.0, dimensions.1);

        let plane = source.read_region((0, 0), level, dimensions)?;
        let gray = DynamicImage::ImageRgba8(plane).to_luma8();
        let mask = binarize(&gray, self.params.foreground_threshold);

        let bbox = largest_outer_component(&mask).ok_or(ExtractError::NoRegionDetected)?;

        info!("Detected region at level {}: x={}, y={}, width={}, height={}",
              level, bbox.x, bbox.y, bbox.width, bbox.height);
        debug!("Region spans columns {}..{} and rows {}..{}",
               bbox.x, bbox.end_x(), bbox.y, bbox.end_y());
        self.logger.log(&format!(
            "ROI at level {}: ({}, {}) {}x{}",
            level, bbox.x, bbox.y, bbox.width, bbox.height
        ))?;

        Ok((level, bbox))
    }
}

/// Bounding box of the outer contour enclosing the largest area
///
/// Returns `None` when the mask contains no foreground at all.
pub(crate) fn largest_outer_component(mask: &GrayImage) -> Option<BoundingBox> {
    let contours: Vec<Contour<u32>> = find_contours(mask);
    debug!("Border following found {} contour(s)", contours.len());

    contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .max_by(|a, b| enclosed_area(a).total_cmp(&enclosed_area(b)))
        .map(|c| bounding_box(c))
}

/// Shoelace area of a contour polygon
///
/// Degenerate contours (fewer than three points) enclose zero area but are
/// still candidates, so an isolated bright pixel yields a 1x1 box rather
/// than no detection.
fn enclosed_area(contour: &Contour<u32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        doubled += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    doubled.abs() / 2.0
}

/// Axis-aligned bounding box of a contour's points (inclusive extents)
fn bounding_box(contour: &Contour<u32>) -> BoundingBox {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}
