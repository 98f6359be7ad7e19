//! Application state shared by all handlers.

use crate::services::pipeline::GenerationPipeline;
use studymill_core::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: GenerationPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: GenerationPipeline) -> Self {
        Self { config, pipeline }
    }
}
