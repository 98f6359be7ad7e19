//! Studymill Services Layer
//!
//! Clients for the external services the pipeline depends on. Today that is the
//! text-generation service; the HTTP layer talks to it only through
//! [`GenerationClient`].

pub mod generation;

pub use generation::{GenerationClient, GenerationError, OllamaClient};
