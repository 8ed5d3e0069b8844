//! Pyramid structure inspection command
//!
//! Prints the level layout of a pyramidal image: level count, per-level
//! pixel dimensions and downsample factors.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::errors::{ExtractError, ExtractResult};
use crate::pyramid::{PyramidSource, PyramidSourceFactory};
use crate::utils::logger::Logger;

/// Command for printing the pyramid structure of an input file
pub struct InfoCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Whether to enable verbose output
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> InfoCommand<'a> {
    /// Create a new info command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new InfoCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ExtractResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| ExtractError::GenericError("Missing input file".to_string()))?
            .clone();
        let verbose = args.get_flag("verbose");

        Ok(InfoCommand { input_file, verbose, logger })
    }
}

/// Render the base-plane summary line shown in verbose mode
fn base_plane_summary(source: &dyn PyramidSource) -> ExtractResult<String> {
    let (width, height) = source.base_dimensions()?;
    let megapixels = width as f64 * height as f64 / 1_000_000.0;
    Ok(format!("  Base plane: {}x{} ({:.1} MP)", width, height, megapixels))
}

impl<'a> Command for InfoCommand<'a> {
    fn execute(&self) -> ExtractResult<()> {
        info!("Inspecting pyramid structure of {}", self.input_file);

        let source = PyramidSourceFactory::new().open(&self.input_file)?;

        println!("Pyramid structure of {}:", self.input_file);
        println!("  Levels: {}", source.level_count());
        if self.verbose {
            debug!("Verbose mode enabled");
            println!("{}", base_plane_summary(source.as_ref())?);
        }
        for level in 0..source.level_count() {
            let (width, height) = source.level_dimensions(level)?;
            let downsample = source.level_downsample(level)?;
            println!("  Level {}: {}x{} (downsample {:.2})", level, width, height, downsample);
        }

        self.logger.log(&format!("Inspected pyramid structure of {}", self.input_file))?;
        Ok(())
    }
}
