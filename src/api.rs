//! Main interface to the slidecrop library

use log::info;

use crate::errors::ExtractResult;
use crate::pipeline::{ExtractionResult, NullProgress, Pipeline, PipelineOptions, ProgressObserver};
use crate::pyramid::PyramidSourceFactory;
use crate::utils::logger::Logger;

/// Main interface to the slidecrop library
pub struct SlideCrop {
    logger: Logger,
    options: PipelineOptions,
}

impl SlideCrop {
    /// Create a new SlideCrop instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "slidecrop.log"
    ///
    /// # Returns
    /// A SlideCrop instance or an error if initialization fails
    pub fn new(log_file: Option<&str>) -> ExtractResult<Self> {
        let log_path = log_file.unwrap_or("slidecrop.log");
        let logger = Logger::new(log_path)?;
        Ok(SlideCrop {
            logger,
            options: PipelineOptions::default(),
        })
    }

    /// Create an instance with non-default pipeline options
    pub fn with_options(log_file: Option<&str>, options: PipelineOptions) -> ExtractResult<Self> {
        let mut api = Self::new(log_file)?;
        api.options = options;
        Ok(api)
    }

    /// Extract the specimen region from a pyramidal image
    ///
    /// Detects the specimen on the coarsest pyramid level, maps it to full
    /// resolution, reads that region and persists it losslessly as PNG.
    /// Every stage failure is folded into the returned result; this method
    /// never panics or returns an error.
    ///
    /// # Arguments
    /// * `input_path` - Path to the pyramidal image file
    /// * `output_path` - Destination path for the lossless output image
    /// * `quality` - Accepted for interface stability (1-100); PNG output
    ///   is lossless so the value has no effect on pixel fidelity
    ///
    /// # Returns
    /// The outcome of the run: success flag, message and per-stage timing
    pub fn extract_region(&self, input_path: &str, output_path: &str, quality: u8) -> ExtractionResult {
        self.extract_region_with_observer(input_path, output_path, quality, &NullProgress)
    }

    /// Extract the specimen region, reporting progress to an observer
    ///
    /// # Arguments
    /// * `input_path` - Path to the pyramidal image file
    /// * `output_path` - Destination path for the lossless output image
    /// * `quality` - Accepted for interface stability; inert under PNG
    /// * `observer` - Sink for stage transitions and read checkpoints
    ///
    /// # Returns
    /// The outcome of the run: success flag, message and per-stage timing
    pub fn extract_region_with_observer(&self,
                                        input_path: &str,
                                        output_path: &str,
                                        quality: u8,
                                        observer: &dyn ProgressObserver) -> ExtractionResult {
        info!("Extracting specimen region from {} to {}", input_path, output_path);

        let options = PipelineOptions {
            quality,
            ..self.options
        };
        let pipeline = Pipeline::new(&self.logger, options);
        let result = pipeline.run(input_path, output_path, observer);
        let _ = self.logger.log_timing(&result.timing);
        result
    }

    /// Summarize the pyramid structure of an image file
    ///
    /// # Arguments
    /// * `input_path` - Path to the pyramidal image file
    ///
    /// # Returns
    /// A human-readable description of the levels, or an error if the file
    /// cannot be opened
    pub fn describe(&self, input_path: &str) -> ExtractResult<String> {
        let source = PyramidSourceFactory::new().open(input_path)?;

        let mut result = format!("Pyramid structure of {}:\n", input_path);
        result.push_str(&format!("  Levels: {}\n", source.level_count()));
        let (base_width, base_height) = source.base_dimensions()?;
        result.push_str(&format!("  Base dimensions: {}x{}\n", base_width, base_height));
        for level in 0..source.level_count() {
            let (width, height) = source.level_dimensions(level)?;
            let downsample = source.level_downsample(level)?;
            result.push_str(&format!(
                "  Level {}: {}x{} (downsample {:.2})\n",
                level, width, height, downsample
            ));
        }

        Ok(result)
    }
}
