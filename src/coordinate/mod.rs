//! Multi-resolution coordinate handling
//!
//! This module provides structures for pixel rectangles expressed in the
//! coordinate space of a specific pyramid level, and the mapping that
//! rescales a detection-level rectangle into base-level (full-resolution)
//! coordinates.

mod bbox;
mod scale;

pub use bbox::BoundingBox;
pub use scale::{map_to_base, ScaledRegion};
