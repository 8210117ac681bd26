mod exam_set;
mod exam_type;
mod file_id;
mod generation_job;
mod generation_request;
mod generation_status;
mod paragraphs;
mod question;
mod source_file;

pub use exam_set::ExamSet;
pub use exam_type::{ExamType, UnsupportedExamType, parse_exam_types};
pub use file_id::FileId;
pub use generation_job::GenerationJob;
pub use generation_request::GenerationRequest;
pub use generation_status::GenerationStatus;
pub use paragraphs::split_paragraphs;
pub use question::{
    BLANK_MARKER, Difficulty, FillBlankQuestion, MCQ_OPTION_COUNT, McqQuestion, QuestionRecord,
    SolutionQuestion,
};
pub use source_file::SourceFile;
