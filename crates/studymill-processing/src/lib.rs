//! Studymill Processing Library
//!
//! Everything that happens to an upload between the HTTP boundary and the generation
//! service: admission control ([`UploadValidator`]), text extraction
//! ([`TextExtractor`]) and prompt construction ([`build_prompt`]).

pub mod extract;
pub mod prompt;
pub mod validator;

// Re-export commonly used types
pub use extract::{DocumentTextExtractor, ExtractionError, TextExtractor};
pub use prompt::build_prompt;
pub use validator::{normalize_mime_type, DocumentKind, UploadValidator, ValidationError};
