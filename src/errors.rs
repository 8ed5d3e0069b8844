//! Custom error types for the extraction pipeline

use std::fmt;
use std::io;

/// Pipeline-specific error types
///
/// The first four variants are the failure classes surfaced to callers
/// through `ExtractionResult`; the remaining variants are backend and CLI
/// plumbing errors that are folded into those classes at the pipeline
/// boundary.
#[derive(Debug)]
pub enum ExtractError {
    /// The pyramid source could not be opened or parsed
    SourceOpenFailed(String),
    /// Coarse-level thresholding found no foreground component
    NoRegionDetected,
    /// The pyramid source could not satisfy a region read
    RegionReadFailed(String),
    /// The output image could not be persisted
    WriteFailed(String),
    /// Requested pyramid level does not exist
    InvalidLevel(usize),
    /// I/O error
    IoError(io::Error),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::SourceOpenFailed(msg) => write!(f, "Failed to open pyramid source: {}", msg),
            ExtractError::NoRegionDetected => write!(f, "No specimen region detected"),
            ExtractError::RegionReadFailed(msg) => write!(f, "Region read failed: {}", msg),
            ExtractError::WriteFailed(msg) => write!(f, "Failed to write output image: {}", msg),
            ExtractError::InvalidLevel(level) => write!(f, "Invalid pyramid level: {}", level),
            ExtractError::IoError(e) => write!(f, "I/O error: {}", e),
            ExtractError::GenericError(msg) => write!(f, "Extraction error: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<io::Error> for ExtractError {
    fn from(error: io::Error) -> Self {
        ExtractError::IoError(error)
    }
}

impl From<String> for ExtractError {
    fn from(msg: String) -> Self {
        ExtractError::GenericError(msg)
    }
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;
