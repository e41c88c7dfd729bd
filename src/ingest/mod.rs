// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{AggregateOutcome, SourceFailure, SourceProvider};
use crate::metrics::ensure_metrics_described;
use metrics::{counter, histogram};

/// Call every provider in order and concatenate what they return.
///
/// A failing provider contributes nothing; its error is logged, counted and
/// reported in `failures`. This never fails as a whole.
pub async fn aggregate(providers: &[Box<dyn SourceProvider>]) -> AggregateOutcome {
    ensure_metrics_described();

    let mut out = AggregateOutcome::default();
    for p in providers {
        let t0 = std::time::Instant::now();
        let res = p.fetch_latest().await;
        histogram!("digest_source_fetch_ms", "source" => p.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);

        match res {
            Ok(mut v) => {
                tracing::info!(provider = p.name(), count = v.len(), "provider fetched");
                counter!("digest_source_listings_total", "source" => p.name())
                    .increment(v.len() as u64);
                out.listings.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("digest_source_errors_total", "source" => p.name()).increment(1);
                out.failures.push(SourceFailure {
                    source: p.name(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Listing;
    use anyhow::{anyhow, Result};

    struct Fixed(&'static str, Vec<&'static str>);

    #[async_trait::async_trait]
    impl SourceProvider for Fixed {
        async fn fetch_latest(&self) -> Result<Vec<Listing>> {
            Ok(self
                .1
                .iter()
                .map(|t| Listing {
                    source: self.0.into(),
                    title: t.to_string(),
                    ..Default::default()
                })
                .collect())
        }
        fn name(&self) -> &'static str {
            self.0
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl SourceProvider for Broken {
        async fn fetch_latest(&self) -> Result<Vec<Listing>> {
            Err(anyhow!("connection refused"))
        }
        fn name(&self) -> &'static str {
            "Broken"
        }
    }

    #[tokio::test]
    async fn concatenates_in_provider_order_and_skips_failures() {
        let providers: Vec<Box<dyn SourceProvider>> = vec![
            Box::new(Fixed("A", vec!["a1", "a2"])),
            Box::new(Broken),
            Box::new(Fixed("B", vec!["b1"])),
        ];
        let out = aggregate(&providers).await;
        let titles: Vec<_> = out.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2", "b1"]);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].source, "Broken");
        assert!(out.failures[0].reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn no_providers_yields_empty() {
        let out = aggregate(&[]).await;
        assert!(out.listings.is_empty());
        assert!(out.failures.is_empty());
    }

    #[tokio::test]
    async fn no_dedup_at_this_stage() {
        let providers: Vec<Box<dyn SourceProvider>> = vec![
            Box::new(Fixed("A", vec!["same"])),
            Box::new(Fixed("A", vec!["same"])),
        ];
        assert_eq!(aggregate(&providers).await.listings.len(), 2);
    }
}
