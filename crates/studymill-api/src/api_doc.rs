//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use studymill_core::models::{GenerateResponse, MaterialType};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studymill API",
        version = "0.1.0",
        description = "Turns uploaded documents (PDF, DOCX, TXT) into study material: flashcards, multiple-choice questions, short-answer questions or a practice exam."
    ),
    paths(
        handlers::generate::generate_material,
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(schemas(GenerateResponse, ErrorResponse, MaterialType)),
    tags(
        (name = "generation", description = "Study material generation"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
