mod error_response;
mod exam_preview;
mod generation_status;
mod health;
mod start_generation;

pub use error_response::ErrorResponse;
pub use exam_preview::{ApiCallResponse, ExamPreviewRequest, ExamPreviewResponse, exam_preview_handler};
pub use generation_status::{GenerationStatusResponse, generation_status_handler};
pub use health::health_handler;
pub use start_generation::{
    StartGenerationRequest, StartGenerationResponse, start_generation_handler,
};
