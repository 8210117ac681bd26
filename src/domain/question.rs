use serde::{Deserialize, Deserializer, Serialize};

use super::ExamType;

/// Token a fill-in-the-blank question uses to mark its gap.
pub const BLANK_MARKER: &str = "_____";
pub const MCQ_OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

// Models are loose with casing, send null, or invent levels; anything
// unrecognised is treated as medium rather than losing the question.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        let level = raw
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        Ok(match level.as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl McqQuestion {
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("empty question".to_string());
        }
        if self.options.len() != MCQ_OPTION_COUNT {
            return Err(format!(
                "expected {} options, got {}",
                MCQ_OPTION_COUNT,
                self.options.len()
            ));
        }
        if self.correct_answer >= MCQ_OPTION_COUNT {
            return Err(format!("correct answer index {} out of range", self.correct_answer));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlankQuestion {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl FillBlankQuestion {
    pub fn validate(&self) -> Result<(), String> {
        let blanks = self.question.matches(BLANK_MARKER).count();
        if blanks != 1 {
            return Err(format!("expected exactly one blank marker, found {}", blanks));
        }
        if self.answer.trim().is_empty() {
            return Err("empty answer".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionQuestion {
    pub problem: String,
    pub solution: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl SolutionQuestion {
    pub fn validate(&self) -> Result<(), String> {
        if self.problem.trim().is_empty() {
            return Err("empty problem".to_string());
        }
        if self.solution.trim().is_empty() {
            return Err("empty solution".to_string());
        }
        Ok(())
    }
}

/// One generated question. Serialises to the bare record shape, without a
/// type tag, because the enclosing array already names the exam type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuestionRecord {
    Mcq(McqQuestion),
    FillBlank(FillBlankQuestion),
    Solution(SolutionQuestion),
}

impl QuestionRecord {
    pub fn exam_type(&self) -> ExamType {
        match self {
            QuestionRecord::Mcq(_) => ExamType::Mcq,
            QuestionRecord::FillBlank(_) => ExamType::FillBlanks,
            QuestionRecord::Solution(_) => ExamType::Solutions,
        }
    }

    /// Decodes one array element as the record shape of `exam_type`.
    pub fn from_value(exam_type: ExamType, value: serde_json::Value) -> Result<Self, String> {
        let record = match exam_type {
            ExamType::Mcq => {
                let mcq: McqQuestion = serde_json::from_value(value).map_err(|e| e.to_string())?;
                mcq.validate()?;
                QuestionRecord::Mcq(mcq)
            }
            ExamType::FillBlanks => {
                let blank: FillBlankQuestion =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                blank.validate()?;
                QuestionRecord::FillBlank(blank)
            }
            ExamType::Solutions => {
                let solution: SolutionQuestion =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                solution.validate()?;
                QuestionRecord::Solution(solution)
            }
        };
        Ok(record)
    }
}
