// src/config/llm.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

fn default_timeout_secs() -> u64 {
    60
}

/// Connection settings for an OpenAI-compatible chat endpoint (Groq, OpenRouter, OpenAI).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Reads `LLM_API_KEY`, `LLM_BASE_URL`, `LLM_MODEL` and optional `LLM_TIMEOUT_SECS`.
    /// Returns `None` without an API key; the run then scores heuristically.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
        let base_url = env::var("LLM_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = env::var("LLM_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_secs = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_else(default_timeout_secs);

        Some(Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            model: model.trim().to_string(),
            timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear() {
        for k in ["LLM_API_KEY", "LLM_BASE_URL", "LLM_MODEL", "LLM_TIMEOUT_SECS"] {
            env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn missing_key_disables_llm() {
        clear();
        env::set_var("LLM_MODEL", "some-model");
        assert!(LlmConfig::from_env().is_none());
        clear();
    }

    #[serial_test::serial]
    #[test]
    fn env_values_are_trimmed_and_defaulted() {
        clear();
        env::set_var("LLM_API_KEY", " sk-test ");
        env::set_var("LLM_BASE_URL", "https://openrouter.ai/api/v1/");
        let cfg = LlmConfig::from_env().expect("configured");
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.timeout_secs, 60);
        clear();
    }
}
