use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of study material the generation service is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Flashcards,
    MultipleChoice,
    ShortAnswer,
    PracticeExam,
}

impl MaterialType {
    pub const ALL: [MaterialType; 4] = [
        MaterialType::Flashcards,
        MaterialType::MultipleChoice,
        MaterialType::ShortAnswer,
        MaterialType::PracticeExam,
    ];

    /// Wire value, as sent by the upload form and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Flashcards => "flashcards",
            MaterialType::MultipleChoice => "multiple_choice",
            MaterialType::ShortAnswer => "short_answer",
            MaterialType::PracticeExam => "practice_exam",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Flashcards => "Flash Cards",
            MaterialType::MultipleChoice => "Multiple Choice Questions",
            MaterialType::ShortAnswer => "Short Answer Questions",
            MaterialType::PracticeExam => "Practice Exam",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid material type '{0}'. Must be one of: flashcards, multiple_choice, short_answer, practice_exam")]
pub struct ParseMaterialTypeError(pub String);

impl FromStr for MaterialType {
    type Err = ParseMaterialTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        MaterialType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ParseMaterialTypeError(s.to_string()))
    }
}

/// Durable record of one successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMaterial {
    pub id: Uuid,
    pub filename: String,
    pub material_type: MaterialType,
    pub generated_content: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the result store; `id` and `created_at` are assigned on write.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeneratedMaterial {
    pub filename: String,
    pub material_type: MaterialType,
    pub generated_content: String,
}

/// Success body of `POST /api/generate`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    /// Full completion text returned by the generation service
    pub result: String,
    /// Identifier of the persisted record
    pub id: Uuid,
}

impl From<GeneratedMaterial> for GenerateResponse {
    fn from(material: GeneratedMaterial) -> Self {
        GenerateResponse {
            result: material.generated_content,
            id: material.id,
        }
    }
}
