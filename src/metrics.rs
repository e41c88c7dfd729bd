use std::path::Path;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const ENV_METRICS_TEXTFILE: &str = "METRICS_TEXTFILE";

/// One-time metrics registration (so every series carries HELP text in the snapshot).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "digest_source_listings_total",
            "Listings returned by source providers."
        );
        describe_counter!("digest_source_errors_total", "Provider fetch/parse errors.");
        describe_histogram!(
            "digest_source_fetch_ms",
            "Provider fetch time in milliseconds."
        );
        describe_counter!(
            "digest_filtered_total",
            "Listings rejected by a filter predicate."
        );
        describe_counter!("digest_dedup_total", "Listings dropped as duplicate ids.");
        describe_counter!(
            "digest_scored_total",
            "Listings scored, by mode (llm/fallback)."
        );
        describe_counter!(
            "digest_notify_errors_total",
            "Notification sink delivery errors."
        );
        describe_gauge!("digest_last_run_ts", "Unix ts when the digest last ran.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Record the run timestamp and write the exposition text to `path`
    /// (node_exporter textfile-collector style: tmp file + rename).
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        gauge!("digest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        let tmp = path.with_extension("prom.tmp");
        std::fs::write(&tmp, self.handle.render())
            .with_context(|| format!("writing metrics to {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("renaming metrics file to {}", path.display()))?;
        Ok(())
    }
}
