mod chat_completions_client;
mod mock_generation_client;

pub use chat_completions_client::{ChatCompletionsClient, create_generation_client};
pub use mock_generation_client::MockGenerationClient;
