//! Per-request inference: vector building, scaling, prediction, and label
//! decoding as explicit result-returning stages.

pub mod pipeline;

pub use pipeline::{build_feature_vector, InferencePipeline, PipelineStage};
