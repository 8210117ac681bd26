use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ExamType, FillBlankQuestion, McqQuestion, QuestionRecord, SolutionQuestion};

/// The per-file question arrays. Append-only for the life of a job.
///
/// Stored arrays may predate record validation, so reading keeps every
/// element that still decodes and skips the rest instead of failing the file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSet {
    #[serde(default, deserialize_with = "readable_records")]
    pub mcqs: Vec<McqQuestion>,
    #[serde(default, deserialize_with = "readable_records")]
    pub fill_blanks: Vec<FillBlankQuestion>,
    #[serde(default, deserialize_with = "readable_records")]
    pub solutions: Vec<SolutionQuestion>,
}

fn readable_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(position, error = %e, "Skipping unreadable stored question");
            }
        }
    }
    Ok(records)
}

impl ExamSet {
    pub fn append(&mut self, records: impl IntoIterator<Item = QuestionRecord>) {
        for record in records {
            match record {
                QuestionRecord::Mcq(q) => self.mcqs.push(q),
                QuestionRecord::FillBlank(q) => self.fill_blanks.push(q),
                QuestionRecord::Solution(q) => self.solutions.push(q),
            }
        }
    }

    pub fn count(&self, exam_type: ExamType) -> usize {
        match exam_type {
            ExamType::Mcq => self.mcqs.len(),
            ExamType::FillBlanks => self.fill_blanks.len(),
            ExamType::Solutions => self.solutions.len(),
        }
    }

    pub fn total(&self) -> usize {
        ExamType::ALL.iter().map(|t| self.count(*t)).sum()
    }
}
