pub mod errors;
pub mod pyramid;
pub mod detector;
pub mod coordinate;
pub mod stager;
pub mod writer;
pub mod pipeline;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::SlideCrop;

pub use coordinate::{map_to_base, BoundingBox, ScaledRegion};
pub use errors::{ExtractError, ExtractResult};
pub use pipeline::{ExtractionResult, NullProgress, Pipeline, PipelineOptions, PipelineStage, ProgressObserver, StageTiming};
pub use pyramid::{ImagePyramidSource, MemoryPyramidSource, PyramidSource, PyramidSourceFactory};
