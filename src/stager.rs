//! Full-resolution region staging
//!
//! The level-0 read is a single blocking call that can run for several
//! seconds on very large regions. The stager wraps that call and emits a
//! fixed number of cosmetic progress checkpoints to the observer so a
//! frontend can render movement; the checkpoints never gate and never
//! split the underlying read, and the final checkpoint always fires after
//! the read has returned.

use image::RgbaImage;
use log::info;

use crate::coordinate::ScaledRegion;
use crate::errors::{ExtractError, ExtractResult};
use crate::pipeline::ProgressObserver;
use crate::pyramid::PyramidSource;
use crate::utils::logger::Logger;

/// Number of read checkpoints emitted per staged read
pub const DEFAULT_READ_CHECKPOINTS: u32 = 10;

/// Stager for the full-resolution region read
pub struct RegionStager<'a> {
    /// Logger for recording operations
    logger: &'a Logger,
    /// Checkpoints emitted per read
    checkpoints: u32,
}

impl<'a> RegionStager<'a> {
    /// Create a new stager
    ///
    /// # Arguments
    /// * `logger` - Logger for recording operations
    /// * `checkpoints` - Number of progress checkpoints to emit (at least 1)
    pub fn new(logger: &'a Logger, checkpoints: u32) -> Self {
        RegionStager {
            logger,
            checkpoints: checkpoints.max(1),
        }
    }

    /// Read the scaled region from the base level
    ///
    /// Requests exactly the region's own width and height from level 0.
    /// Any source error, bounds or I/O, surfaces as `RegionReadFailed`.
    ///
    /// # Arguments
    /// * `source` - Pyramid source to read from
    /// * `region` - Region in base-level coordinates
    /// * `observer` - Sink for read progress checkpoints
    ///
    /// # Returns
    /// The staged pixel data, or `RegionReadFailed`
    pub fn stage(&self,
                 source: &dyn PyramidSource,
                 region: &ScaledRegion,
                 observer: &dyn ProgressObserver) -> ExtractResult<RgbaImage> {
        info!("Staging {}x{} region at ({}, {}) from level 0",
              region.width(), region.height(), region.x(), region.y());

        // Half the checkpoints signal that the read is in flight, the rest
        // (including the last) fire once it has returned.
        let before = self.checkpoints / 2;
        for done in 1..=before {
            observer.on_read_progress(done, self.checkpoints);
        }

        let plane = source
            .read_region((region.x(), region.y()), 0, (region.width(), region.height()))
            .map_err(|e| match e {
                ExtractError::RegionReadFailed(msg) => ExtractError::RegionReadFailed(msg),
                other => ExtractError::RegionReadFailed(other.to_string()),
            })?;

        for done in before + 1..=self.checkpoints {
            observer.on_read_progress(done, self.checkpoints);
        }

        self.logger.log(&format!(
            "Staged {}x{} pixels from level 0",
            plane.width(),
            plane.height()
        ))?;

        Ok(plane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::{map_to_base, BoundingBox};
    use crate::pipeline::PipelineStage;
    use crate::pyramid::MemoryPyramidSource;
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;

    struct RecordingObserver {
        checkpoints: RefCell<Vec<(u32, u32)>>,
    }

    impl RecordingObserver {
        fn new() -> Self {
            RecordingObserver {
                checkpoints: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProgressObserver for RecordingObserver {
        fn on_stage(&self, _stage: PipelineStage) {}

        fn on_read_progress(&self, completed: u32, total: u32) {
            self.checkpoints.borrow_mut().push((completed, total));
        }
    }

    struct FailingSource;

    impl PyramidSource for FailingSource {
        fn level_count(&self) -> usize {
            1
        }

        fn level_dimensions(&self, _level: usize) -> ExtractResult<(u32, u32)> {
            Ok((1024, 1024))
        }

        fn level_downsample(&self, _level: usize) -> ExtractResult<f64> {
            Ok(1.0)
        }

        fn read_region(&self, _origin: (u32, u32), _level: usize, _size: (u32, u32)) -> ExtractResult<RgbaImage> {
            Err(ExtractError::IoError(std::io::Error::other("disk gone")))
        }
    }

    fn test_logger() -> Logger {
        let path = std::env::temp_dir().join("slidecrop-stager-test.log");
        Logger::new(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_requests_exact_scaled_size() {
        let base = RgbaImage::from_pixel(200, 200, Rgba([99, 99, 99, 255]));
        let source = MemoryPyramidSource::new(vec![base]).unwrap();
        let logger = test_logger();
        let stager = RegionStager::new(&logger, DEFAULT_READ_CHECKPOINTS);

        // floor(13 * 2.5) = 32, floor(7 * 2.5) = 17
        let region = map_to_base(BoundingBox::new(4, 4, 13, 7), 2.5);
        let plane = stager.stage(&source, &region, &RecordingObserver::new()).unwrap();
        assert_eq!(plane.dimensions(), (32, 17));
    }

    #[test]
    fn test_emits_all_checkpoints_in_order() {
        let base = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));
        let source = MemoryPyramidSource::new(vec![base]).unwrap();
        let logger = test_logger();
        let stager = RegionStager::new(&logger, 10);
        let observer = RecordingObserver::new();

        let region = map_to_base(BoundingBox::new(0, 0, 8, 8), 1.0);
        stager.stage(&source, &region, &observer).unwrap();

        let seen = observer.checkpoints.borrow();
        let expected: Vec<(u32, u32)> = (1..=10).map(|i| (i, 10)).collect();
        assert_eq!(*seen, expected);
    }

    #[test]
    fn test_source_failure_becomes_region_read_failed() {
        let logger = test_logger();
        let stager = RegionStager::new(&logger, 10);
        let observer = RecordingObserver::new();

        let region = map_to_base(BoundingBox::new(0, 0, 8, 8), 1.0);
        let result = stager.stage(&FailingSource, &region, &observer);
        assert!(matches!(result, Err(ExtractError::RegionReadFailed(_))));

        // Only the pre-read checkpoints were emitted
        assert_eq!(observer.checkpoints.borrow().len(), 5);
    }
}
