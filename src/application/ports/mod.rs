mod generation_client;
mod job_state_store;
mod repository_error;
mod text_splitter;

pub use generation_client::{GenerationClient, GenerationClientError};
pub use job_state_store::JobStateStore;
pub use repository_error::RepositoryError;
pub use text_splitter::{TextSplitter, TextSplitterError};
