use serde_json::Value;

use crate::domain::{ExamType, QuestionRecord};

#[derive(Debug, thiserror::Error)]
#[error("malformed generation output: {reason}")]
pub struct MalformedGenerationOutput {
    pub reason: String,
}

impl MalformedGenerationOutput {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Turns a raw provider response into typed question records.
///
/// The response must be a JSON object (optionally inside a markdown code
/// fence). A missing or non-array result key yields no records. Elements that
/// do not match the record shape are dropped and reported in the log.
pub fn parse_generation_output(
    raw: &str,
    exam_type: ExamType,
) -> Result<Vec<QuestionRecord>, MalformedGenerationOutput> {
    let body = strip_code_fence(raw);
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        MalformedGenerationOutput::new(format!("response is not valid JSON: {}", e))
    })?;

    let Value::Object(mut object) = parsed else {
        return Err(MalformedGenerationOutput::new(
            "response is JSON but not an object",
        ));
    };

    let Some(Value::Array(items)) = object.remove(exam_type.array_key()) else {
        tracing::debug!(
            exam_type = %exam_type,
            key = exam_type.array_key(),
            "Generation output has no result array"
        );
        return Ok(Vec::new());
    };

    let total = items.len();
    let mut records = Vec::with_capacity(total);
    for (position, item) in items.into_iter().enumerate() {
        match QuestionRecord::from_value(exam_type, item) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!(
                    exam_type = %exam_type,
                    position,
                    reason = %reason,
                    "Dropping malformed question record"
                );
            }
        }
    }

    if records.len() < total {
        tracing::warn!(
            exam_type = %exam_type,
            kept = records.len(),
            dropped = total - records.len(),
            "Generation output contained malformed records"
        );
    }

    Ok(records)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
