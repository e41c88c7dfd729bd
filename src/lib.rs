// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod filter;
pub mod ingest;
pub mod listing;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod score;
pub mod select;

// ---- Re-exports for stable public API ----
pub use crate::config::{DigestConfig, FilterPolicy, LlmConfig};
pub use crate::listing::Listing;
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::pipeline::{Pipeline, PipelineRecord};

use crate::report::FileReportStore;
use crate::score::{DisabledOracle, OpenAiCompatOracle, ScoringOracle};

/// Oracle from `LLM_*` env vars, or [`DisabledOracle`] when none is configured.
pub fn build_oracle_from_env() -> anyhow::Result<Box<dyn ScoringOracle>> {
    match LlmConfig::from_env() {
        Some(cfg) => {
            // Safe diagnostics: model + base url + key length only
            tracing::info!(
                model = %cfg.model,
                base_url = %cfg.base_url,
                key_len = cfg.api_key.len(),
                "llm configured"
            );
            Ok(Box::new(OpenAiCompatOracle::new(&cfg)?))
        }
        None => {
            tracing::warn!("LLM_API_KEY not set, scoring will use the heuristic");
            Ok(Box::new(DisabledOracle))
        }
    }
}

/// Production wiring: config from disk, live providers, env-configured oracle and sinks.
pub fn pipeline_from_env() -> anyhow::Result<Pipeline> {
    let config = config::load_config_default();
    Ok(Pipeline::new(
        config,
        ingest::providers::default_providers()?,
        build_oracle_from_env()?,
        Box::new(FileReportStore::default()),
        NotifierMux::from_env(),
    ))
}
