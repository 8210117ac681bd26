use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExamSet, FileId, GenerationJob};

/// A user's study file together with its generation state and questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub id: FileId,
    pub title: String,
    pub content: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exam_generation: Option<GenerationJob>,
    #[serde(default)]
    pub exams: ExamSet,
}

impl SourceFile {
    pub fn new(title: String, content: String, owner_email: String) -> Self {
        Self {
            id: FileId::new(),
            title,
            content,
            owner_email,
            created_at: Utc::now(),
            updated_at: None,
            exam_generation: None,
            exams: ExamSet::default(),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Generation state as a polling client sees it; never-started files are pending.
    pub fn generation(&self) -> GenerationJob {
        self.exam_generation.clone().unwrap_or_default()
    }
}
