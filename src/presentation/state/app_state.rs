use std::sync::Arc;

use crate::application::ports::JobStateStore;
use crate::application::services::{ExamGenerationService, ExamPreviewService};

#[derive(Clone)]
pub struct AppState {
    pub generation_service: Arc<ExamGenerationService>,
    pub preview_service: Arc<ExamPreviewService>,
    pub job_state_store: Arc<dyn JobStateStore>,
}
