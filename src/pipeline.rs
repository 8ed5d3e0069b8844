//! Extraction pipeline orchestration
//!
//! Sequences detection, coordinate mapping, region staging and output
//! writing as a strictly linear stage machine, accumulates per-stage wall
//! clock timing, and folds every failure into a single result value. No
//! stage retries, no stage re-enters an earlier one, and no error escapes
//! the pipeline boundary.

use std::fmt;
use std::time::{Duration, Instant};

use log::{error, info};

use crate::coordinate::map_to_base;
use crate::detector::{DetectorParams, RoiDetector};
use crate::errors::ExtractResult;
use crate::pyramid::{PyramidSource, PyramidSourceFactory};
use crate::stager::{RegionStager, DEFAULT_READ_CHECKPOINTS};
use crate::utils::logger::Logger;
use crate::writer::{OutputWriter, DEFAULT_QUALITY};

/// States of the extraction pipeline
///
/// Transitions are strictly sequential; `Failed` is reachable from every
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Pipeline created, source not yet opened
    Idle,
    /// Locating the specimen on the coarsest level
    Detecting,
    /// Rescaling the detected box into base-level coordinates
    Mapping,
    /// Reading the full-resolution region
    Staging,
    /// Normalizing and persisting the output
    WritingOutput,
    /// Pipeline finished successfully
    Completed,
    /// Pipeline aborted
    Failed,
}

impl PipelineStage {
    /// Human-readable stage label, used in progress and failure messages
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "Opening source",
            PipelineStage::Detecting => "Detecting image region",
            PipelineStage::Mapping => "Calculating coordinates",
            PipelineStage::Staging => "Reading image data",
            PipelineStage::WritingOutput => "Saving image",
            PipelineStage::Completed => "Completed",
            PipelineStage::Failed => "Failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-stage elapsed wall clock time for one pipeline run
///
/// Every field defaults to zero and is set at most once; stages never
/// reached on a failed run stay at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTiming {
    /// Coarse-level read, binarization and component selection
    pub detection: Duration,
    /// Bounding box rescaling into base coordinates
    pub coordinate_calc: Duration,
    /// Full-resolution region read
    pub image_reading: Duration,
    /// RGB normalization
    pub processing: Duration,
    /// Output encode and write
    pub saving: Duration,
    /// Whole run, populated on success and failure alike
    pub total: Duration,
}

impl StageTiming {
    /// Multi-line timing breakdown for console reporting
    pub fn summary(&self) -> String {
        format!(
            "Total execution time: {:.2}s\n\
             Breakdown:\n\
             - ROI detection:          {:.2}s\n\
             - Coordinate calculation: {:.2}s\n\
             - Image reading:          {:.2}s\n\
             - Image processing:       {:.2}s\n\
             - Image saving:           {:.2}s",
            self.total.as_secs_f64(),
            self.detection.as_secs_f64(),
            self.coordinate_calc.as_secs_f64(),
            self.image_reading.as_secs_f64(),
            self.processing.as_secs_f64(),
            self.saving.as_secs_f64()
        )
    }
}

/// Outcome of one pipeline invocation
///
/// Constructed once per run and immutable afterwards. `succeeded == false`
/// covers every failure class; the message distinguishes them.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Whether the region was extracted and persisted
    pub succeeded: bool,
    /// Human-readable outcome, naming the failing stage on failure
    pub message: String,
    /// Per-stage timing, always populated
    pub timing: StageTiming,
}

impl ExtractionResult {
    fn success(message: String, timing: StageTiming) -> Self {
        ExtractionResult {
            succeeded: true,
            message,
            timing,
        }
    }

    fn failure(message: String, timing: StageTiming) -> Self {
        ExtractionResult {
            succeeded: false,
            message,
            timing,
        }
    }
}

/// Sink for pipeline progress signals
///
/// Stage transitions and read checkpoints are purely informational; they
/// never gate execution and are safe to ignore entirely.
pub trait ProgressObserver {
    /// The pipeline entered a new stage
    fn on_stage(&self, stage: PipelineStage);

    /// A staged-read checkpoint fired (`completed` of `total`)
    fn on_read_progress(&self, completed: u32, total: u32);
}

/// Observer that discards every signal
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_stage(&self, _stage: PipelineStage) {}

    fn on_read_progress(&self, _completed: u32, _total: u32) {}
}

/// Tunable pipeline parameters
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Output quality, accepted for interface stability (PNG output is
    /// lossless, the value has no effect on fidelity)
    pub quality: u8,
    /// Region detection parameters
    pub detector: DetectorParams,
    /// Progress checkpoints per staged read
    pub read_checkpoints: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            quality: DEFAULT_QUALITY,
            detector: DetectorParams::default(),
            read_checkpoints: DEFAULT_READ_CHECKPOINTS,
        }
    }
}

/// Orchestrator for one extraction run
pub struct Pipeline<'a> {
    /// Logger for recording operations
    logger: &'a Logger,
    /// Pipeline parameters
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline
    ///
    /// # Arguments
    /// * `logger` - Logger for recording operations
    /// * `options` - Pipeline parameters
    pub fn new(logger: &'a Logger, options: PipelineOptions) -> Self {
        Pipeline { logger, options }
    }

    /// Run the pipeline against a pyramidal image file
    ///
    /// Opens the pyramid source, extracts the specimen region and writes
    /// it to `output_path`. The source is released when the run ends,
    /// success or failure.
    ///
    /// # Arguments
    /// * `input_path` - Path to the pyramidal image
    /// * `output_path` - Destination for the lossless output
    /// * `observer` - Sink for progress signals
    ///
    /// # Returns
    /// The run outcome; never an error
    pub fn run(&self, input_path: &str, output_path: &str, observer: &dyn ProgressObserver) -> ExtractionResult {
        let start = Instant::now();
        let mut timing = StageTiming::default();
        let mut stage = PipelineStage::Idle;
        observer.on_stage(stage);

        let outcome = {
            // Scoped acquisition: the boxed source drops at the end of this
            // block on every exit path, releasing backend resources.
            match PyramidSourceFactory::new().open(input_path) {
                Ok(source) => self.execute(source.as_ref(), output_path, observer, &mut timing, &mut stage),
                Err(e) => Err(e),
            }
        };

        timing.total = start.elapsed();
        self.conclude(outcome, stage, timing, observer)
    }

    /// Run the pipeline against an already open pyramid source
    ///
    /// Backend-agnostic entry point for embedders and tests that construct
    /// their own source.
    pub fn run_with_source(&self,
                           source: &dyn PyramidSource,
                           output_path: &str,
                           observer: &dyn ProgressObserver) -> ExtractionResult {
        let start = Instant::now();
        let mut timing = StageTiming::default();
        let mut stage = PipelineStage::Idle;
        observer.on_stage(stage);

        let outcome = self.execute(source, output_path, observer, &mut timing, &mut stage);

        timing.total = start.elapsed();
        self.conclude(outcome, stage, timing, observer)
    }

    /// Drive the stage sequence, recording per-stage timing
    fn execute(&self,
               source: &dyn PyramidSource,
               output_path: &str,
               observer: &dyn ProgressObserver,
               timing: &mut StageTiming,
               stage: &mut PipelineStage) -> ExtractResult<(u32, u32)> {
        *stage = PipelineStage::Detecting;
        observer.on_stage(*stage);
        let step = Instant::now();
        let detector = RoiDetector::new(self.logger, self.options.detector);
        let (level, bbox) = detector.detect(source)?;
        timing.detection = step.elapsed();

        *stage = PipelineStage::Mapping;
        observer.on_stage(*stage);
        let step = Instant::now();
        let downsample = source.level_downsample(level)?;
        let region = map_to_base(bbox, downsample);
        timing.coordinate_calc = step.elapsed();
        info!("Scaled region: ({}, {}) {}x{} at level 0",
              region.x(), region.y(), region.width(), region.height());

        *stage = PipelineStage::Staging;
        observer.on_stage(*stage);
        let step = Instant::now();
        let stager = RegionStager::new(self.logger, self.options.read_checkpoints);
        let plane = stager.stage(source, &region, observer)?;
        timing.image_reading = step.elapsed();

        *stage = PipelineStage::WritingOutput;
        observer.on_stage(*stage);
        let writer = OutputWriter::new(self.logger);

        let step = Instant::now();
        let rgb = writer.normalize(plane);
        timing.processing = step.elapsed();

        let step = Instant::now();
        writer.write(&rgb, output_path, self.options.quality)?;
        timing.saving = step.elapsed();

        Ok((rgb.width(), rgb.height()))
    }

    /// Fold the stage outcome into the final result value
    fn conclude(&self,
                outcome: ExtractResult<(u32, u32)>,
                stage: PipelineStage,
                timing: StageTiming,
                observer: &dyn ProgressObserver) -> ExtractionResult {
        match outcome {
            Ok((width, height)) => {
                observer.on_stage(PipelineStage::Completed);
                let message = format!("Successfully saved {}x{} region at full resolution", width, height);
                info!("{}", message);
                ExtractionResult::success(message, timing)
            }
            Err(e) => {
                observer.on_stage(PipelineStage::Failed);
                let message = format!("{} failed: {}", stage.label(), e);
                error!("{}", message);
                let _ = self.logger.log(&message);
                ExtractionResult::failure(message, timing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ExtractError, ExtractResult};
    use crate::pyramid::MemoryPyramidSource;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    fn test_logger(name: &str) -> Logger {
        let path = std::env::temp_dir().join(name);
        Logger::new(path.to_str().unwrap()).unwrap()
    }

    fn black(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
    }

    fn fill_rect(plane: &mut RgbaImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                plane.put_pixel(x, y, Rgba([value, value, value, 255]));
            }
        }
    }

    /// Three-level pyramid with downsamples [1, 4, 16] whose coarsest level
    /// carries a bright rectangle at (10, 10, 50, 30) in its own pixels.
    fn canonical_pyramid() -> MemoryPyramidSource {
        let mut base = black(1600, 960);
        fill_rect(&mut base, 160, 160, 800, 480, 220);
        let mut mid = black(400, 240);
        fill_rect(&mut mid, 40, 40, 200, 120, 220);
        let mut coarse = black(100, 60);
        fill_rect(&mut coarse, 10, 10, 50, 30, 220);
        MemoryPyramidSource::new(vec![base, mid, coarse]).unwrap()
    }

    /// Source that reads the coarse level fine but fails every level-0 read
    struct BaseReadFails {
        inner: MemoryPyramidSource,
    }

    impl crate::pyramid::PyramidSource for BaseReadFails {
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
            if level == 0 {
                return Err(ExtractError::IoError(std::io::Error::other("truncated source")));
            }
            self.inner.read_region(origin, level, size)
        }
    }

    #[test]
    fn test_canonical_pyramid_extraction_succeeds() {
        let logger = test_logger("slidecrop-pipeline-ok.log");
        let pipeline = Pipeline::new(&logger, PipelineOptions::default());
        let output = std::env::temp_dir().join("slidecrop-pipeline-ok.png");

        let result = pipeline.run_with_source(&canonical_pyramid(), output.to_str().unwrap(), &NullProgress);

        assert!(result.succeeded, "pipeline failed: {}", result.message);
        assert!(result.message.contains("800x480"), "unexpected message: {}", result.message);
        assert!(result.timing.total > Duration::ZERO);
        assert!(result.timing.detection > Duration::ZERO);
        assert!(result.timing.image_reading > Duration::ZERO);

        let saved = image::open(&output).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (800, 480));
        // Interior of the extracted region is specimen, not border
        assert_eq!(saved.get_pixel(400, 240).0, [220, 220, 220]);
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_all_black_image_reports_no_region() {
        let logger = test_logger("slidecrop-pipeline-black.log");
        let pipeline = Pipeline::new(&logger, PipelineOptions::default());
        let source = MemoryPyramidSource::new(vec![black(256, 256), black(64, 64)]).unwrap();
        let output = std::env::temp_dir().join("slidecrop-pipeline-black.png");

        let result = pipeline.run_with_source(&source, output.to_str().unwrap(), &NullProgress);

        assert!(!result.succeeded);
        assert!(result.message.contains("No specimen region detected"),
                "unexpected message: {}", result.message);
        assert!(result.timing.total > Duration::ZERO);
        assert!(!output.exists());
    }

    #[test]
    fn test_failing_base_read_stops_at_staging() {
        let logger = test_logger("slidecrop-pipeline-readfail.log");
        let pipeline = Pipeline::new(&logger, PipelineOptions::default());
        let source = BaseReadFails {
            inner: canonical_pyramid(),
        };
        let output = std::env::temp_dir().join("slidecrop-pipeline-readfail.png");

        let result = pipeline.run_with_source(&source, output.to_str().unwrap(), &NullProgress);

        assert!(!result.succeeded);
        assert!(result.message.contains("Region read failed"),
                "unexpected message: {}", result.message);
        // Stages before the failure are timed, the failed read is not
        assert!(result.timing.detection > Duration::ZERO);
        assert!(result.timing.image_reading == Duration::ZERO);
        assert!(result.timing.saving == Duration::ZERO);
        assert!(result.timing.total > Duration::ZERO);
    }

    #[test]
    fn test_detected_box_encloses_specimen_within_downsample() {
        // An off-center rectangle detected on a coarse level must come back
        // enclosing the original extent to within one coarse pixel
        // (= downsample base pixels) per edge. The base rect spans
        // (300, 200)..(700, 520); on the 8x level that covers pixels
        // 37..=87 horizontally and 25..=64 vertically.
        let mut base = black(1024, 1024);
        fill_rect(&mut base, 300, 200, 400, 320, 200);
        let mut mid = black(256, 256);
        fill_rect(&mut mid, 75, 50, 100, 80, 200);
        let mut coarse = black(128, 128);
        fill_rect(&mut coarse, 37, 25, 51, 40, 200);
        let source = MemoryPyramidSource::new(vec![base, mid, coarse]).unwrap();

        let logger = test_logger("slidecrop-pipeline-enclose.log");
        let detector = RoiDetector::new(&logger, DetectorParams::default());
        let (level, bbox) = detector.detect(&source).unwrap();
        let downsample = source.level_downsample(level).unwrap();
        let region = map_to_base(bbox, downsample);

        let tolerance = downsample as u32;
        assert!(region.x() <= 300 && 300 - region.x() <= tolerance);
        assert!(region.y() <= 200 && 200 - region.y() <= tolerance);
        assert!(region.x() + region.width() + tolerance >= 700);
        assert!(region.y() + region.height() + tolerance >= 520);
    }
}
