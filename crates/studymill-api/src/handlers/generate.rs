use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studymill_core::models::GenerateResponse;
use studymill_core::{AppError, MaterialType};
use studymill_processing::ValidationError;
use studymill_storage::ArtifactGuard;
use tracing::Instrument;

/// Name of the form field carrying the requested material type
pub const MATERIAL_TYPE_FIELD: &str = "materialType";

fn multipart_error(err: MultipartError, max_upload_bytes: usize) -> ValidationError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::FileTooLarge {
            max_mb: max_upload_bytes / 1024 / 1024,
        }
    } else {
        ValidationError::MalformedMultipart(err.body_text())
    }
}

/// Generate study material from an uploaded document
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generation",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Form with the document file (field `studyDocument` by default) and a `materialType` text field"),
    responses(
        (status = 200, description = "Material generated and saved", body = GenerateResponse),
        (status = 400, description = "Invalid upload or material type", body = ErrorResponse),
        (status = 500, description = "Extraction, generation or persistence failed", body = ErrorResponse)
    )
)]
pub async fn generate_material(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateResponse>, HttpAppError> {
    let mut multipart =
        multipart.map_err(|rej| ValidationError::MalformedMultipart(rej.body_text()))?;
    let file_field = state.config.upload_field_name();
    let max_upload_bytes = state.config.max_upload_size_bytes();

    // Dropping the guard on any early return removes the stored upload
    let mut upload: Option<ArtifactGuard> = None;
    let mut material_type_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_bytes))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == file_field {
            if upload.is_some() {
                return Err(ValidationError::MalformedMultipart(format!(
                    "Only one '{}' file may be uploaded",
                    file_field
                ))
                .into());
            }

            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            state.pipeline.validate_upload(&filename, &content_type)?;

            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_upload_bytes))?;

            // The body limit leaves room for multipart framing, so the file itself is checked here
            if data.len() > max_upload_bytes {
                return Err(ValidationError::FileTooLarge {
                    max_mb: max_upload_bytes / 1024 / 1024,
                }
                .into());
            }

            upload = Some(
                state
                    .pipeline
                    .materialize(file_field, &filename, &content_type, data)
                    .await?,
            );
        } else if field_name == MATERIAL_TYPE_FIELD {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, max_upload_bytes))?;
            material_type_raw = Some(value);
        } else {
            tracing::debug!(field = %field_name, "Ignoring unexpected form field");
        }
    }

    let upload = upload.ok_or(ValidationError::MissingFile)?;

    let material_type: MaterialType = material_type_raw
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::MissingMaterialType)?
        .parse()
        .map_err(ValidationError::from)?;

    // Once generation has been requested, a client disconnect must not abort it
    let pipeline = state.pipeline.clone();
    let task = async move { pipeline.run(upload, material_type).await };
    let saved = tokio::spawn(task.instrument(tracing::Span::current()))
        .await
        .map_err(|e| AppError::Internal(format!("Generation task failed: {}", e)))??;

    Ok(Json(GenerateResponse::from(saved)))
}
