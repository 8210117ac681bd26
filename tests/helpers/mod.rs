#![allow(dead_code)]

pub mod test_postgres;

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use lectern::application::ports::{
    GenerationClient, GenerationClientError, TextSplitter, TextSplitterError,
};
use lectern::domain::{ExamType, GenerationRequest};

pub const OWNER_EMAIL: &str = "student@example.com";

type Responder = dyn Fn(&GenerationRequest) -> Result<String, GenerationClientError> + Send + Sync;

/// Generation client driven by a closure. Every request is recorded.
pub struct ScriptedGenerationClient {
    responder: Box<Responder>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerationClient {
    pub fn new(
        responder: impl Fn(&GenerationRequest) -> Result<String, GenerationClientError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with one valid record tagged with its chunk position.
    pub fn one_per_cell() -> Self {
        Self::new(|request| Ok(valid_response(request.exam_type, chunk_position(request))))
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationClientError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

pub struct FailingSplitter;

#[async_trait]
impl TextSplitter for FailingSplitter {
    async fn split(&self, _text: &str) -> Result<Vec<String>, TextSplitterError> {
        Err(TextSplitterError::SplittingFailed("tokenizer exploded".to_string()))
    }
}

/// 1-based chunk position the prompt was built for, read from "(chunk i/n)".
pub fn chunk_position(request: &GenerationRequest) -> usize {
    let marker = "(chunk ";
    let start = request.user_prompt.find(marker).unwrap() + marker.len();
    let rest = &request.user_prompt[start..];
    rest[..rest.find('/').unwrap()].parse().unwrap()
}

/// A response holding one valid record that mentions `chunk`.
pub fn valid_response(exam_type: ExamType, chunk: usize) -> String {
    let body = match exam_type {
        ExamType::Mcq => json!({
            "mcqs": [{
                "question": format!("Question from chunk {}", chunk),
                "options": ["A", "B", "C", "D"],
                "correctAnswer": 1,
                "difficulty": "easy"
            }]
        }),
        ExamType::FillBlanks => json!({
            "fillBlanks": [{
                "question": format!("Chunk {} covers _____.", chunk),
                "answer": "rust",
                "difficulty": "medium"
            }]
        }),
        ExamType::Solutions => json!({
            "solutions": [{
                "problem": format!("Problem from chunk {}", chunk),
                "solution": "42",
                "steps": ["think", "compute"],
                "difficulty": "hard"
            }]
        }),
    };
    body.to_string()
}

/// Three short paragraphs that a 20-character chunker keeps apart.
pub fn three_chunk_content() -> String {
    "First topic.\n\nSecond topic.\n\nThird topic.".to_string()
}
