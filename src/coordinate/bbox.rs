//! Bounding box structure for detected regions
//!
//! This module defines the BoundingBox structure that describes a
//! rectangular area of a pyramid level. The coordinates are in the pixel
//! space of the level the box was computed in, with (0,0) at the top-left
//! corner of that level.

/// Axis-aligned pixel rectangle at a specific pyramid level
///
/// Represents a rectangular area defined by its top-left corner coordinates
/// and dimensions. A valid box satisfies `x + width <= level width` and
/// `y + height <= level height` at the level it was computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// X-coordinate of the top-left corner (pixels from left)
    pub x: u32,

    /// Y-coordinate of the top-left corner (pixels from top)
    pub y: u32,

    /// Width of the box in pixels
    pub width: u32,

    /// Height of the box in pixels
    pub height: u32,
}

impl BoundingBox {
    /// Create a new bounding box
    ///
    /// # Arguments
    /// * `x` - X-coordinate of the top-left corner
    /// * `y` - Y-coordinate of the top-left corner
    /// * `width` - Width of the box in pixels
    /// * `height` - Height of the box in pixels
    ///
    /// # Returns
    /// A new BoundingBox with the specified coordinates and dimensions
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        BoundingBox { x, y, width, height }
    }

    /// Get the rightmost X coordinate (exclusive)
    ///
    /// Useful for boundary checks when iterating over the box.
    pub fn end_x(&self) -> u32 {
        self.x + self.width
    }

    /// Get the bottommost Y coordinate (exclusive)
    ///
    /// Useful for boundary checks when iterating over the box.
    pub fn end_y(&self) -> u32 {
        self.y + self.height
    }
}
