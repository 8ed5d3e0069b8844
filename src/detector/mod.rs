//! Region-of-interest detection on the coarsest pyramid level
//!
//! The specimen sits on a near-black border, so a fixed intensity threshold
//! on the cheapest pyramid plane separates foreground from background. The
//! detector binarizes that plane, follows the outer borders of the
//! foreground components, and returns the bounding box of the component
//! with the largest enclosed area.

mod mask;
mod roi;

pub use mask::binarize;
pub use roi::{DetectorParams, RoiDetector, DEFAULT_FOREGROUND_THRESHOLD};
