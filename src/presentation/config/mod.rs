mod environment;
mod scaffold_config;
mod settings;

pub use environment::Environment;
pub use scaffold_config::ScaffoldConfig;
pub use settings::{DatabaseSettings, GenerationSettings, LlmSettings, ServerSettings, Settings};
