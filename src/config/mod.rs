pub mod digest;
pub mod llm;

pub use digest::{load_config_default, load_config_from, DigestConfig, FilterPolicy};
pub use llm::LlmConfig;
