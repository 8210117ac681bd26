use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::{GenerationClient, GenerationClientError};
use crate::domain::{ExamType, GenerationRequest};

/// Canned provider for scaffold mode: one well-formed question per request.
pub struct MockGenerationClient {
    response_delay: Duration,
}

impl MockGenerationClient {
    pub fn new(response_delay_ms: u64) -> Self {
        Self {
            response_delay: Duration::from_millis(response_delay_ms),
        }
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationClientError> {
        if !self.response_delay.is_zero() {
            tokio::time::sleep(self.response_delay).await;
        }

        let body = match request.exam_type {
            ExamType::Mcq => json!({
                "mcqs": [{
                    "question": "Which statement best summarises this section?",
                    "options": ["The first idea", "The second idea", "The third idea", "None of these"],
                    "correctAnswer": 0,
                    "difficulty": "easy"
                }]
            }),
            ExamType::FillBlanks => json!({
                "fillBlanks": [{
                    "question": "The key term of this section is _____.",
                    "answer": "placeholder",
                    "difficulty": "medium"
                }]
            }),
            ExamType::Solutions => json!({
                "solutions": [{
                    "problem": "Work through the main example of this section.",
                    "solution": "See steps",
                    "steps": ["Read the section", "Identify the example", "Apply it"],
                    "difficulty": "hard"
                }]
            }),
        };

        Ok(body.to_string())
    }
}
