use super::ExamType;

/// A single prompt for the text-generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub exam_type: ExamType,
    pub system_prompt: String,
    pub user_prompt: String,
}
