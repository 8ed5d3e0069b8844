//! Lossless output writing
//!
//! Normalizes staged pixel data to 3-channel RGB and persists it as PNG.
//! The writer accepts a numeric quality for interface compatibility with
//! lossy encoders, but PNG encoding is lossless and the value never
//! influences pixel fidelity. The codec is never switched based on it.

use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use log::{debug, info};

use crate::errors::{ExtractError, ExtractResult};
use crate::utils::logger::Logger;

/// Default quality value, kept for interface stability
pub const DEFAULT_QUALITY: u8 = 80;

/// Smallest accepted quality value
pub const MIN_QUALITY: u8 = 1;

/// Largest accepted quality value
pub const MAX_QUALITY: u8 = 100;

/// Clamp a quality value into the accepted 1..=100 range
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

/// Writer for the extracted region
pub struct OutputWriter<'a> {
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> OutputWriter<'a> {
    /// Create a new output writer
    pub fn new(logger: &'a Logger) -> Self {
        OutputWriter { logger }
    }

    /// Normalize staged pixels to a 3-channel RGB representation
    ///
    /// Pyramid backends hand out RGBA planes; the alpha channel carries no
    /// specimen information and is dropped here.
    pub fn normalize(&self, plane: RgbaImage) -> RgbImage {
        DynamicImage::ImageRgba8(plane).to_rgb8()
    }

    /// Persist an RGB plane losslessly as PNG
    ///
    /// # Arguments
    /// * `plane` - Normalized pixel data
    /// * `output_path` - Destination file path
    /// * `quality` - Accepted for interface stability; has no effect on a
    ///   lossless encoding
    ///
    /// # Returns
    /// Ok on success, or `WriteFailed` if the encode or the write fails
    pub fn write(&self, plane: &RgbImage, output_path: &str, quality: u8) -> ExtractResult<()> {
        let quality = clamp_quality(quality);
        debug!("Quality {} requested; PNG output is lossless, value is ignored", quality);

        info!("Saving {}x{} region to {}", plane.width(), plane.height(), output_path);
        plane
            .save_with_format(Path::new(output_path), ImageFormat::Png)
            .map_err(|e| ExtractError::WriteFailed(format!("{}: {}", output_path, e)))?;

        self.logger.log(&format!(
            "Saved {}x{} region to {}",
            plane.width(),
            plane.height(),
            output_path
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_logger() -> Logger {
        let path = std::env::temp_dir().join("slidecrop-writer-test.log");
        Logger::new(path.to_str().unwrap()).unwrap()
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(clamp_quality(0), MIN_QUALITY);
        assert_eq!(clamp_quality(80), 80);
        assert_eq!(clamp_quality(255), MAX_QUALITY);
    }

    #[test]
    fn test_normalize_drops_alpha() {
        let logger = test_logger();
        let writer = OutputWriter::new(&logger);
        let mut plane = gradient(4, 4);
        plane.put_pixel(0, 0, Rgba([10, 20, 30, 0]));

        let rgb = writer.normalize(plane);
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_round_trip_is_lossless_for_any_quality() {
        let logger = test_logger();
        let writer = OutputWriter::new(&logger);
        let rgb = writer.normalize(gradient(31, 17));

        for quality in [1, 80, 100] {
            let path = std::env::temp_dir().join(format!("slidecrop-writer-q{}.png", quality));
            writer.write(&rgb, path.to_str().unwrap(), quality).unwrap();

            let reread = image::open(&path).unwrap().to_rgb8();
            assert_eq!(reread, rgb, "PNG round trip changed pixels at quality {}", quality);
            std::fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn test_unwritable_destination_is_write_failed() {
        let logger = test_logger();
        let writer = OutputWriter::new(&logger);
        let rgb = writer.normalize(gradient(4, 4));

        let result = writer.write(&rgb, "/nonexistent-dir/out.png", DEFAULT_QUALITY);
        assert!(matches!(result, Err(ExtractError::WriteFailed(_))));
    }
}
