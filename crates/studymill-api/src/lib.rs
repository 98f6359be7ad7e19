//! Studymill API Library
//!
//! HTTP surface of the service: handlers, middleware, the generation pipeline and
//! application setup.

mod api_doc;
mod handlers;
mod middleware;
mod telemetry;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::generate::MATERIAL_TYPE_FIELD;
pub use handlers::health::BANNER;
pub use services::pipeline::{GenerationPipeline, PipelineStage};
pub use state::AppState;
