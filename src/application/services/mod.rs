mod cell_generator;
mod exam_generation_pipeline;
mod exam_generation_service;
mod exam_generation_worker;
mod exam_preview_service;
mod prompt_builder;
mod result_merger;

pub use cell_generator::{CellError, CellGenerator};
pub use exam_generation_pipeline::{
    ExamGenerationPipeline, GenerationMessage, GenerationSummary, JobInfrastructureError,
};
pub use exam_generation_service::{ExamGenerationService, StartGenerationError};
pub use exam_generation_worker::ExamGenerationWorker;
pub use exam_preview_service::{ExamPreview, ExamPreviewService, PreviewCall};
pub use prompt_builder::{PROMPT_CONTENT_CEILING, PromptBuilder, truncate_to_paragraphs};
pub use result_merger::{MalformedGenerationOutput, parse_generation_output};
