pub mod config;
pub mod extract;
pub mod intent;
pub mod prompts;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use extract::{extract_json, ExtractError};
pub use intent::{AgentReply, FilterSpec, IntentClassification, INTENT_TAXONOMY};
