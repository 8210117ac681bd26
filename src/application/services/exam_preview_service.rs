use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::GenerationClient;
use crate::domain::{ExamSet, ExamType};

use super::{CellGenerator, PromptBuilder};

/// Runs the generation cells for a single piece of content synchronously,
/// without touching any stored job. Used to try prompts against a provider.
pub struct ExamPreviewService {
    cells: CellGenerator,
}

#[derive(Debug, Clone)]
pub struct PreviewCall {
    pub exam_type: ExamType,
    pub duration_ms: u64,
    pub question_count: usize,
    pub error: Option<String>,
}

impl PreviewCall {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExamPreview {
    pub data: ExamSet,
    pub calls: Vec<PreviewCall>,
}

impl ExamPreviewService {
    pub fn new(generation_client: Arc<dyn GenerationClient>) -> Self {
        Self {
            cells: CellGenerator::new(generation_client, PromptBuilder::default()),
        }
    }

    pub async fn preview(
        &self,
        content: &str,
        exam_types: &[ExamType],
        chunk_index: usize,
        total_chunks: usize,
    ) -> ExamPreview {
        let mut preview = ExamPreview::default();

        for &exam_type in exam_types {
            let started = Instant::now();
            let outcome = self
                .cells
                .generate(content, exam_type, chunk_index, total_chunks)
                .await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let call = match outcome {
                Ok(records) => {
                    let question_count = records.len();
                    preview.data.append(records);
                    PreviewCall {
                        exam_type,
                        duration_ms,
                        question_count,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(exam_type = %exam_type, error = %e, "Preview cell failed");
                    PreviewCall {
                        exam_type,
                        duration_ms,
                        question_count: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            preview.calls.push(call);
        }

        tracing::info!(
            chunk = chunk_index + 1,
            questions = preview.data.total(),
            "Preview generated"
        );
        preview
    }
}
