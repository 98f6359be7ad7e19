pub mod pipeline;

pub use pipeline::{GenerationPipeline, PipelineStage};
