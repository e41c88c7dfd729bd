// src/ingest/types.rs
use anyhow::Result;

use crate::listing::Listing;

/// A job board adapter. Each call is one independent fetch; failures are the caller's to absorb.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Listing>>;
    fn name(&self) -> &'static str;
}

/// Why a provider contributed nothing this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: &'static str,
    pub reason: String,
}

/// Merged output of all providers plus the ones that failed.
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    pub listings: Vec<Listing>,
    pub failures: Vec<SourceFailure>,
}
