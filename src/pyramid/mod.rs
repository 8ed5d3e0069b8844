//! Multi-resolution pyramid source abstraction
//!
//! This module defines the capability interface for multi-resolution image
//! stores and the backends that implement it. The rest of the pipeline
//! (detector, mapper, stager) only sees the trait, so alternate pyramidal
//! formats can be plugged in without touching the extraction logic.

mod source;
mod image_backend;
mod memory;

pub use source::{PyramidSource, PyramidSourceFactory};
pub use image_backend::ImagePyramidSource;
pub use memory::MemoryPyramidSource;
