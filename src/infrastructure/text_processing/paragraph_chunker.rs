use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::split_paragraphs;

pub const DEFAULT_CHUNK_MAX_CHARS: usize = 3000;

/// Greedy paragraph packer. Paragraphs are never cut: one longer than
/// `max_chars` becomes a chunk of its own.
pub struct ParagraphChunker {
    max_chars: usize,
}

impl ParagraphChunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_MAX_CHARS)
    }
}

#[async_trait]
impl TextSplitter for ParagraphChunker {
    async fn split(&self, text: &str) -> Result<Vec<String>, TextSplitterError> {
        if self.max_chars == 0 {
            return Err(TextSplitterError::InvalidChunkSize(self.max_chars));
        }
        Ok(chunk_content(text, self.max_chars))
    }
}

/// Packs blank-line separated paragraphs into chunks of about `max_chars`
/// characters. The running length includes the two-character separator
/// between packed paragraphs, but the overflow check does not, so a chunk may
/// exceed the limit by one separator. Text without any non-blank paragraph
/// comes back as a single chunk holding the raw input.
pub fn chunk_content(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in split_paragraphs(text) {
        let paragraph_len = paragraph.chars().count();

        if current_len + paragraph_len > max_chars && current_len > 0 {
            chunks.push(current.trim().to_string());
            current = paragraph.to_string();
            current_len = paragraph_len;
        } else {
            if current_len > 0 {
                current.push_str("\n\n");
                current_len += 2;
            }
            current.push_str(paragraph);
            current_len += paragraph_len;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    if chunks.is_empty() {
        vec![text.to_string()]
    } else {
        chunks
    }
}
