//! Studymill Storage Library
//!
//! Transient holding area for uploaded documents. An upload lives here only for the
//! duration of the request that produced it: it is materialized under a unique key,
//! read back for text extraction, and removed exactly once by an [`ArtifactGuard`].
//!
//! # Key format
//!
//! Keys are flat file names: `{field}-{unix_millis}-{sequence}{.ext}`. The sequence is
//! process-wide and monotonically increasing, so two uploads in the same millisecond
//! still get distinct keys. Keys never contain `/`, `\` or `..`.

pub mod guard;
pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use guard::ArtifactGuard;
pub use local::LocalArtifactStore;
pub use traits::{ArtifactStore, StorageError, StorageResult, UploadedArtifact};
