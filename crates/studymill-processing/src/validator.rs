use std::path::Path;
use studymill_core::models::ParseMaterialTypeError;
use studymill_core::{AppError, Config};

pub const DEFAULT_ALLOWED_CONTENT_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

/// Upload admission errors. All of them are client errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type: '{content_type}' ({filename}). Only PDF, DOC, DOCX and TXT files are allowed.")]
    InvalidFileType {
        content_type: String,
        filename: String,
    },

    #[error("No file uploaded or invalid file type.")]
    MissingFile,

    #[error("Material type is required.")]
    MissingMaterialType,

    #[error(transparent)]
    InvalidMaterialType(#[from] ParseMaterialTypeError),

    #[error("Failed to read multipart form: {0}")]
    MalformedMultipart(String),

    #[error("File too large: maximum upload size is {max_mb} MB")]
    FileTooLarge { max_mb: usize },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Structural family of an accepted document, used to pick an extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
    /// Binary Word 97-2003 format
    LegacyDoc,
    PlainText,
}

impl DocumentKind {
    pub fn from_mime_type(content_type: &str) -> Option<Self> {
        match normalize_mime_type(content_type).to_lowercase().as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            "application/msword" => Some(DocumentKind::LegacyDoc),
            "text/plain" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn from_extension(filename: &str) -> Option<Self> {
        match extension_of(filename)?.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "doc" => Some(DocumentKind::LegacyDoc),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    /// Guess from magic bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"%PDF") {
            Some(DocumentKind::Pdf)
        } else if data.starts_with(b"PK\x03\x04") {
            Some(DocumentKind::Docx)
        } else if data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            Some(DocumentKind::LegacyDoc)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::LegacyDoc => "doc",
            DocumentKind::PlainText => "text",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize MIME type by stripping parameters (e.g. "text/plain; charset=utf-8" -> "text/plain").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Upload admission control
///
/// An upload is admitted when its declared MIME type is allowed, or, failing that,
/// when its filename extension is.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_content_types: Vec<String>,
    allowed_extensions: Vec<String>,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl UploadValidator {
    pub fn new(allowed_content_types: Vec<String>, allowed_extensions: Vec<String>) -> Self {
        Self {
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.allowed_content_types().to_vec(),
            config.allowed_extensions().to_vec(),
        )
    }

    pub fn is_allowed_content_type(&self, content_type: &str) -> bool {
        let normalized = normalize_mime_type(content_type).to_lowercase();
        self.allowed_content_types.iter().any(|ct| *ct == normalized)
    }

    pub fn is_allowed_extension(&self, filename: &str) -> bool {
        extension_of(filename)
            .map(|ext| self.allowed_extensions.contains(&ext))
            .unwrap_or(false)
    }

    /// Admit or reject an upload by its declared type and name. Pure; touches no storage.
    pub fn validate(&self, filename: &str, content_type: &str) -> Result<(), ValidationError> {
        if self.is_allowed_content_type(content_type) {
            return Ok(());
        }

        if self.is_allowed_extension(filename) {
            tracing::debug!(
                filename = %filename,
                content_type = %content_type,
                "Upload admitted by extension fallback"
            );
            return Ok(());
        }

        Err(ValidationError::InvalidFileType {
            content_type: content_type.to_string(),
            filename: filename.to_string(),
        })
    }

    /// Classify an admitted upload.
    ///
    /// Declared MIME type first, then extension, then magic bytes. Anything still
    /// unrecognized is treated as plain text.
    pub fn classify(&self, filename: &str, content_type: &str, data: &[u8]) -> DocumentKind {
        DocumentKind::from_mime_type(content_type)
            .or_else(|| DocumentKind::from_extension(filename))
            .or_else(|| DocumentKind::sniff(data))
            .unwrap_or(DocumentKind::PlainText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_content_types() {
        let validator = UploadValidator::default();
        for ct in DEFAULT_ALLOWED_CONTENT_TYPES {
            assert!(validator.validate("upload.bin", ct).is_ok(), "{}", ct);
        }
    }

    #[test]
    fn test_content_type_parameters_and_case_are_ignored() {
        let validator = UploadValidator::default();
        assert!(validator
            .validate("notes", "Text/Plain; charset=utf-8")
            .is_ok());
    }

    #[test]
    fn test_extension_fallback() {
        let validator = UploadValidator::default();
        assert!(validator
            .validate("lecture.PDF", "application/octet-stream")
            .is_ok());
        assert!(validator.validate("essay.docx", "").is_ok());
    }

    #[test]
    fn test_rejects_image() {
        let validator = UploadValidator::default();
        let err = validator.validate("diagram.png", "image/png").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFileType { .. }));
        assert!(err.to_string().starts_with("Invalid file type"));
    }

    #[test]
    fn test_rejects_missing_extension_with_unknown_type() {
        let validator = UploadValidator::default();
        assert!(validator
            .validate("README", "application/octet-stream")
            .is_err());
    }

    #[test]
    fn test_custom_allow_lists() {
        let validator = UploadValidator::new(vec!["text/markdown".into()], vec![".md".into()]);
        assert!(validator.validate("a.bin", "text/markdown").is_ok());
        assert!(validator.validate("notes.md", "application/octet-stream").is_ok());
        assert!(validator.validate("notes.txt", "text/plain").is_err());
    }

    #[test]
    fn test_classify_prefers_declared_type() {
        let validator = UploadValidator::default();
        assert_eq!(
            validator.classify("x.txt", "application/pdf", b"hello"),
            DocumentKind::Pdf
        );
        assert_eq!(
            validator.classify(
                "essay.docx",
                "application/octet-stream",
                b"PK\x03\x04rest"
            ),
            DocumentKind::Docx
        );
        assert_eq!(
            validator.classify("old.doc", "", &[]),
            DocumentKind::LegacyDoc
        );
    }

    #[test]
    fn test_classify_sniffs_magic_bytes() {
        let validator = UploadValidator::default();
        assert_eq!(
            validator.classify("blob", "application/octet-stream", b"%PDF-1.7"),
            DocumentKind::Pdf
        );
        assert_eq!(
            validator.classify("blob", "", &[0xD0, 0xCF, 0x11, 0xE0, 0xA1]),
            DocumentKind::LegacyDoc
        );
        assert_eq!(
            validator.classify("blob", "", b"plain words"),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn test_validation_errors_map_to_client_errors() {
        use studymill_core::ErrorMetadata;

        let err: AppError = ValidationError::MissingMaterialType.into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "Material type is required.");

        let err: AppError = ValidationError::MissingFile.into();
        assert_eq!(
            err.client_message(),
            "No file uploaded or invalid file type."
        );
    }

    #[test]
    fn test_invalid_material_type_message() {
        let parse_err = "essay"
            .parse::<studymill_core::MaterialType>()
            .unwrap_err();
        let err = ValidationError::from(parse_err);
        assert!(err.to_string().contains("essay"));
    }
}
