//! Rescaling of detection-level boxes into base-level coordinates
//!
//! A bounding box found on a coarse pyramid level has to be re-expressed in
//! level 0 pixels before the full-resolution read. Each coordinate is
//! multiplied by the level's downsample factor and truncated toward zero,
//! so the scaled region can be up to one coarse-level pixel (`downsample`
//! base pixels) smaller than the true specimen extent on each edge. That
//! approximation is part of the contract and is preserved as-is.

use super::bbox::BoundingBox;

/// A bounding box re-expressed in base-level (level 0) coordinates
///
/// Produced only by [`map_to_base`]; the fields are private so a region in
/// base coordinates can never be constructed from unscaled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl ScaledRegion {
    /// X-coordinate of the top-left corner in base-level pixels
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Y-coordinate of the top-left corner in base-level pixels
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Width in base-level pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in base-level pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Map a detection-level bounding box into base-level coordinates
///
/// Multiplies each of x, y, width and height by the downsample factor and
/// truncates toward zero. Pure and infallible: the pyramid descriptor
/// invariant guarantees `downsample >= 1.0`. No clamping against level-0
/// dimensions happens here; the pyramid source rejects out-of-bounds reads.
///
/// # Arguments
/// * `bbox` - Bounding box in the pixel space of the detection level
/// * `downsample` - Downsample factor of that level relative to level 0
///
/// # Returns
/// The corresponding region in base-level coordinates
pub fn map_to_base(bbox: BoundingBox, downsample: f64) -> ScaledRegion {
    ScaledRegion {
        x: (bbox.x as f64 * downsample) as u32,
        y: (bbox.y as f64 * downsample) as u32,
        width: (bbox.width as f64 * downsample) as u32,
        height: (bbox.height as f64 * downsample) as u32,
    }
}
