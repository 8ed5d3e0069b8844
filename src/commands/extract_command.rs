//! Specimen extraction command
//!
//! This module implements the command that runs the full extraction
//! pipeline: coarse-level detection, coordinate mapping, full-resolution
//! read and lossless output, with console progress and a timing report.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::detector::DetectorParams;
use crate::errors::{ExtractError, ExtractResult};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::utils::logger::Logger;
use crate::utils::progress::ConsoleProgress;
use crate::writer::clamp_quality;

/// Command for extracting the specimen region from a pyramidal image
pub struct ExtractCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file
    output_file: String,
    /// Pipeline parameters assembled from the CLI arguments
    options: PipelineOptions,
    /// Whether to enable verbose output
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ExtractCommand<'a> {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new ExtractCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ExtractResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| ExtractError::GenericError("Missing input file".to_string()))?
            .clone();
        info!("Input file: {}", input_file);

        let output_file = args.get_one::<String>("output")
            .ok_or_else(|| ExtractError::GenericError("Missing output file path for extraction".to_string()))?
            .clone();
        info!("Output file: {}", output_file);

        let quality = match args.get_one::<String>("quality") {
            Some(raw) => clamp_quality(raw.parse::<u8>().map_err(|_| {
                ExtractError::GenericError(format!("Invalid quality value: {}", raw))
            })?),
            None => crate::writer::DEFAULT_QUALITY,
        };
        info!("Quality: {} (inert under lossless PNG output)", quality);

        let foreground_threshold = match args.get_one::<String>("threshold") {
            Some(raw) => raw.parse::<u8>().map_err(|_| {
                ExtractError::GenericError(format!("Invalid threshold value: {}", raw))
            })?,
            None => crate::detector::DEFAULT_FOREGROUND_THRESHOLD,
        };
        info!("Foreground threshold: {}", foreground_threshold);

        let options = PipelineOptions {
            quality,
            detector: DetectorParams { foreground_threshold },
            ..PipelineOptions::default()
        };

        let verbose = args.get_flag("verbose");

        Ok(ExtractCommand {
            input_file,
            output_file,
            options,
            verbose,
            logger,
        })
    }

    /// Render the resolved run parameters for console output
    fn settings_report(&self) -> String {
        format!(
            "Input: {}\nOutput: {}\nForeground threshold: {}\nQuality: {} (inert under lossless PNG output)\nRead checkpoints: {}\n",
            self.input_file,
            self.output_file,
            self.options.detector.foreground_threshold,
            self.options.quality,
            self.options.read_checkpoints,
        )
    }
}

impl<'a> Command for ExtractCommand<'a> {
    fn execute(&self) -> ExtractResult<()> {
        info!("Extracting specimen region from {} to {}", self.input_file, self.output_file);

        if self.verbose {
            debug!("Verbose mode enabled");
            print!("{}", self.settings_report());
        }

        let pipeline = Pipeline::new(self.logger, self.options);
        let progress = ConsoleProgress::new();
        let result = pipeline.run(&self.input_file, &self.output_file, &progress);

        println!("{}", result.message);
        println!();
        println!("Timing Information:");
        println!("{}", result.timing.summary());
        self.logger.log_timing(&result.timing)?;

        if result.succeeded {
            Ok(())
        } else {
            Err(ExtractError::GenericError(result.message))
        }
    }
}
