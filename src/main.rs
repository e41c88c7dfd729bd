//! Internship digest — binary entrypoint.
//! Runs the pipeline once for today's UTC date and prints the report.
//! Scheduling (cron, CI) is external.

use std::path::PathBuf;

use anyhow::Result;
use internship_digest::metrics::{Metrics, ENV_METRICS_TEXTFILE};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("internship_digest=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let today = chrono::Utc::now().date_naive();
    let pipeline = internship_digest::pipeline_from_env()?;
    let record = pipeline.run(today).await?;

    if let (Some(m), Ok(path)) = (&metrics, std::env::var(ENV_METRICS_TEXTFILE)) {
        if let Err(e) = m.write_textfile(&PathBuf::from(path)) {
            tracing::warn!(error = ?e, "failed to write metrics textfile");
        }
    }

    tracing::info!(
        raw = record.raw.len(),
        filtered = record.filtered.len(),
        ranked = record.ranked.len(),
        alerts = record.alerts.len(),
        "digest run finished"
    );
    println!("{}", record.report);
    Ok(())
}
