use crate::domain::{ExamType, GenerationRequest, split_paragraphs};

/// Hard ceiling on chunk text embedded in a single prompt. Independent of the
/// chunker's size limit so an oversized chunk can never reach the provider.
pub const PROMPT_CONTENT_CEILING: usize = 3000;

/// Builds one generation request per (chunk, exam type) cell.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    content_ceiling: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PROMPT_CONTENT_CEILING)
    }
}

impl PromptBuilder {
    pub fn new(content_ceiling: usize) -> Self {
        Self { content_ceiling }
    }

    /// `chunk_index` is zero-based; the prompt shows the 1-based position.
    pub fn build(
        &self,
        chunk: &str,
        exam_type: ExamType,
        chunk_index: usize,
        total_chunks: usize,
    ) -> GenerationRequest {
        let template = ExamTemplate::for_exam_type(exam_type);
        let content = truncate_to_paragraphs(chunk, self.content_ceiling);

        let system_prompt = format!(
            "You are an expert exam creator specializing in {}. Do not think or show reasoning - \
             directly return valid JSON only. Skip all analysis and immediately generate questions.",
            exam_type.display_name()
        );

        let user_prompt = format!(
            "Create {name} from this content (chunk {position}/{total}):\n\n\
             {content}\n\n\
             CRITICAL INSTRUCTIONS:\n\
             1. DO NOT think or reason - skip all analysis and directly generate questions\n\
             2. Generate MAXIMUM questions possible (aim for 15-25 questions)\n\
             3. Extract EVERY testable concept, fact, and detail\n\
             4. Make questions challenging and comprehensive\n\
             5. Return ONLY valid JSON in this exact format (NO explanations, NO reasoning):\n\n\
             {format}\n\n\
             Additional rules:\n\
             {rules}\n\
             - Difficulty: vary between \"easy\", \"medium\", \"hard\"\n\n\
             Return ONLY the JSON, nothing else:",
            name = exam_type.display_name(),
            position = chunk_index + 1,
            total = total_chunks,
            content = content,
            format = template.format_example,
            rules = template.rules,
        );

        GenerationRequest {
            exam_type,
            system_prompt,
            user_prompt,
        }
    }
}

struct ExamTemplate {
    format_example: &'static str,
    rules: &'static str,
}

impl ExamTemplate {
    fn for_exam_type(exam_type: ExamType) -> Self {
        match exam_type {
            ExamType::Mcq => Self {
                format_example: r#"{
  "mcqs": [
    {
      "question": "Clear question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "difficulty": "hard"
    }
  ]
}"#,
                rules: "- 4 options per question\n\
                        - correctAnswer is the 0-indexed position of the right option (0-3)\n\
                        - Make distractors plausible",
            },
            ExamType::FillBlanks => Self {
                format_example: r#"{
  "fillBlanks": [
    {
      "question": "Question with _____ blank",
      "answer": "correct answer",
      "difficulty": "medium"
    }
  ]
}"#,
                rules: "- Use exactly one _____ (five underscores) to mark the blank\n\
                        - Answer should be a single word or short phrase\n\
                        - Context should make the answer clear",
            },
            ExamType::Solutions => Self {
                format_example: r#"{
  "solutions": [
    {
      "problem": "Problem statement",
      "solution": "Final answer",
      "steps": ["Step 1", "Step 2", "Step 3"],
      "difficulty": "hard"
    }
  ]
}"#,
                rules: "- Provide an ordered step-by-step breakdown in steps\n\
                        - Each step should be clear and logical\n\
                        - Solution should be complete",
            },
        }
    }
}

/// Keeps whole paragraphs while they fit under `ceiling` characters, counting
/// two characters per paragraph separator. A first paragraph that is already
/// too long is cut at the ceiling instead.
pub fn truncate_to_paragraphs(text: &str, ceiling: usize) -> String {
    let mut truncated = String::new();
    let mut length = 0;

    for paragraph in split_paragraphs(text) {
        let paragraph_len = paragraph.chars().count();
        let separator = if length > 0 { 2 } else { 0 };

        if length + separator + paragraph_len <= ceiling {
            if separator > 0 {
                truncated.push_str("\n\n");
            }
            truncated.push_str(paragraph);
            length += separator + paragraph_len;
        } else if length == 0 {
            truncated = paragraph.chars().take(ceiling).collect();
            break;
        } else {
            break;
        }
    }

    truncated
}
