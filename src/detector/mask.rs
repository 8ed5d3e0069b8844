//! Grayscale binarization
//!
//! Wraps [`imageproc::contrast::threshold`] to turn an intensity plane into
//! a binary foreground mask. Pixels strictly brighter than the threshold
//! become foreground (255), everything else background (0).

use image::GrayImage;
use imageproc::contrast::{threshold, ThresholdType};

/// Binarize an intensity plane with a fixed foreground threshold
///
/// # Arguments
/// * `gray` - 8-bit intensity plane
/// * `foreground_threshold` - Pixels with intensity strictly above this
///   value are foreground
///
/// # Returns
/// A mask with foreground at 255 and background at 0
pub fn binarize(gray: &GrayImage, foreground_threshold: u8) -> GrayImage {
    threshold(gray, foreground_threshold, ThresholdType::Binary)
}
