//! # Digest pipeline
//! fetch -> filter -> rank -> select -> publish, strictly in that order.
//!
//! Each stage takes the [`PipelineRecord`] by value and returns a new one with
//! its own field filled in; earlier fields are carried over untouched.

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::DigestConfig;
use crate::filter::{normalize_filter_dedup, FilterChain};
use crate::ingest::aggregate;
use crate::ingest::types::SourceProvider;
use crate::listing::Listing;
use crate::notify::NotifierMux;
use crate::report::{publish, ReportStore};
use crate::score::{rank, ScoringOracle};
use crate::select::pick_alerts;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineRecord {
    pub raw: Vec<Listing>,
    pub filtered: Vec<Listing>,
    pub ranked: Vec<Listing>,
    pub alerts: Vec<Listing>,
    pub report: String,
}

pub async fn fetch_stage(
    record: PipelineRecord,
    providers: &[Box<dyn SourceProvider>],
) -> PipelineRecord {
    let outcome = aggregate(providers).await;
    tracing::info!(
        raw = outcome.listings.len(),
        failed_sources = outcome.failures.len(),
        "fetch stage done"
    );
    PipelineRecord {
        raw: outcome.listings,
        ..record
    }
}

pub fn filter_stage(record: PipelineRecord, chain: &FilterChain) -> PipelineRecord {
    let (filtered, stats) = normalize_filter_dedup(record.raw.clone(), chain);
    tracing::info!(
        kept = filtered.len(),
        rejected = stats.rejected,
        duplicates = stats.duplicates,
        "filter stage done"
    );
    PipelineRecord { filtered, ..record }
}

pub async fn rank_stage(
    record: PipelineRecord,
    max_jobs_to_score: usize,
    oracle: &dyn ScoringOracle,
) -> PipelineRecord {
    let ranked = rank(record.filtered.clone(), max_jobs_to_score, oracle).await;
    tracing::info!(ranked = ranked.len(), "rank stage done");
    PipelineRecord { ranked, ..record }
}

pub fn select_stage(record: PipelineRecord, min_score: u8, max_alerts: usize) -> PipelineRecord {
    let alerts = pick_alerts(&record.ranked, min_score, max_alerts);
    tracing::info!(alerts = alerts.len(), min_score, max_alerts, "select stage done");
    PipelineRecord { alerts, ..record }
}

/// Fails only when the report can't be persisted.
pub async fn publish_stage(
    record: PipelineRecord,
    date: NaiveDate,
    store: &dyn ReportStore,
    notifiers: &NotifierMux,
) -> Result<PipelineRecord> {
    let report = publish(date, &record.alerts, store, notifiers).await?;
    Ok(PipelineRecord { report, ..record })
}

/// Everything one run needs, assembled once by the caller.
pub struct Pipeline {
    pub config: DigestConfig,
    pub providers: Vec<Box<dyn SourceProvider>>,
    pub filter: FilterChain,
    pub oracle: Box<dyn ScoringOracle>,
    pub store: Box<dyn ReportStore>,
    pub notifiers: NotifierMux,
}

impl Pipeline {
    /// Filter chain derived from `config.filter_policy`.
    pub fn new(
        config: DigestConfig,
        providers: Vec<Box<dyn SourceProvider>>,
        oracle: Box<dyn ScoringOracle>,
        store: Box<dyn ReportStore>,
        notifiers: NotifierMux,
    ) -> Self {
        let filter = FilterChain::from_config(&config);
        Self {
            config,
            providers,
            filter,
            oracle,
            store,
            notifiers,
        }
    }

    pub fn with_filter(mut self, filter: FilterChain) -> Self {
        self.filter = filter;
        self
    }

    pub async fn run(&self, date: NaiveDate) -> Result<PipelineRecord> {
        tracing::info!(
            %date,
            providers = self.providers.len(),
            oracle = self.oracle.name(),
            filters = ?self.filter.predicate_names(),
            "digest run starting"
        );

        let record = fetch_stage(PipelineRecord::default(), &self.providers).await;
        let record = filter_stage(record, &self.filter);
        let record = rank_stage(record, self.config.max_jobs_to_score, self.oracle.as_ref()).await;
        let record = select_stage(
            record,
            self.config.min_score_to_alert,
            self.config.max_alerts,
        );
        publish_stage(record, date, self.store.as_ref(), &self.notifiers).await
    }
}
