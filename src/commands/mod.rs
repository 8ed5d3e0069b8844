//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod extract_command;
pub mod info_command;

pub use command_traits::{Command, CommandFactory};
pub use extract_command::ExtractCommand;
pub use info_command::InfoCommand;

use clap::ArgMatches;

use crate::errors::ExtractResult;
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct SlidecropCommandFactory;

impl SlidecropCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        SlidecropCommandFactory
    }
}

impl Default for SlidecropCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for SlidecropCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> ExtractResult<Box<dyn Command + 'a>> {
        // Determine which command to run based on args
        if args.get_flag("info") {
            Ok(Box::new(InfoCommand::new(args, logger)?))
        } else {
            // Default to extraction
            Ok(Box::new(ExtractCommand::new(args, logger)?))
        }
    }
}
