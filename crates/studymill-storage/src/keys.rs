//! Unique key generation for transient artifacts.
//!
//! Key format: `{field}-{unix_millis}-{sequence}{.ext}`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_FIELD_LENGTH: usize = 64;
const MAX_EXTENSION_LENGTH: usize = 16;

/// Generates artifact keys that never repeat within the process.
#[derive(Debug, Default)]
pub struct ArtifactKeyGenerator {
    sequence: AtomicU64,
}

impl ArtifactKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&self, field: &str, original_name: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let field = sanitize_field(field);
        match extension_of(original_name) {
            Some(ext) => format!("{}-{}-{}.{}", field, millis, sequence, ext),
            None => format!("{}-{}-{}", field, millis, sequence),
        }
    }
}

/// Field discriminator restricted to `[A-Za-z0-9_-]`.
fn sanitize_field(field: &str) -> String {
    let sanitized: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_FIELD_LENGTH)
        .collect();
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Lowercased ASCII-alphanumeric extension of the original file name, if any.
pub(crate) fn extension_of(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LENGTH)
        .collect::<String>()
        .to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
