use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kinds of exam content a file can be turned into. Each kind owns one
/// result array on the file document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "mcq")]
    Mcq,
    #[serde(rename = "fillBlanks")]
    FillBlanks,
    #[serde(rename = "solutions")]
    Solutions,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported exam type: {0}")]
pub struct UnsupportedExamType(pub String);

impl ExamType {
    pub const ALL: [ExamType; 3] = [ExamType::Mcq, ExamType::FillBlanks, ExamType::Solutions];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Mcq => "mcq",
            ExamType::FillBlanks => "fillBlanks",
            ExamType::Solutions => "solutions",
        }
    }

    /// Key of the result array, both in generation output and on the stored document.
    pub fn array_key(&self) -> &'static str {
        match self {
            ExamType::Mcq => "mcqs",
            ExamType::FillBlanks => "fillBlanks",
            ExamType::Solutions => "solutions",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExamType::Mcq => "Multiple Choice Questions (MCQs)",
            ExamType::FillBlanks => "Fill in the Blanks",
            ExamType::Solutions => "Solving Solutions",
        }
    }
}

impl FromStr for ExamType {
    type Err = UnsupportedExamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mcq" => Ok(ExamType::Mcq),
            "fillBlanks" => Ok(ExamType::FillBlanks),
            "solutions" => Ok(ExamType::Solutions),
            other => Err(UnsupportedExamType(other.to_string())),
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses caller-supplied exam types, keeping the first occurrence of each
/// in the order given. Any unknown value rejects the whole list.
pub fn parse_exam_types<S: AsRef<str>>(raw: &[S]) -> Result<Vec<ExamType>, UnsupportedExamType> {
    let mut exam_types = Vec::with_capacity(raw.len());
    for value in raw {
        let exam_type = value.as_ref().parse::<ExamType>()?;
        if !exam_types.contains(&exam_type) {
            exam_types.push(exam_type);
        }
    }
    Ok(exam_types)
}
