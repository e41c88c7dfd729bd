// src/ingest/providers/mod.rs
pub mod arbeitnow;
pub mod remotive;
pub mod weworkremotely_rss;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::ingest::types::SourceProvider;

pub use arbeitnow::ArbeitnowProvider;
pub use remotive::RemotiveProvider;
pub use weworkremotely_rss::WeWorkRemotelyProvider;

const USER_AGENT: &str = concat!("internship-digest/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a provider reads its payload from.
pub(crate) enum Mode {
    // Owned copy, so tests can pass any &str.
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl Mode {
    pub(crate) fn http(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building http client")?;
        Ok(Mode::Http {
            url: url.to_string(),
            client,
        })
    }

    /// Raw body for this provider; non-2xx responses are errors.
    pub(crate) async fn body(&self, provider: &'static str) -> Result<String> {
        match self {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http { url, client } => client
                .get(url)
                .send()
                .await
                .with_context(|| format!("{provider} http get()"))?
                .error_for_status()
                .with_context(|| format!("{provider} non-2xx"))?
                .text()
                .await
                .with_context(|| format!("{provider} http .text()")),
        }
    }
}

/// The public boards the digest pulls from, in invocation order.
pub fn default_providers() -> Result<Vec<Box<dyn SourceProvider>>> {
    Ok(vec![
        Box::new(RemotiveProvider::from_url(remotive::DEFAULT_URL)?),
        Box::new(ArbeitnowProvider::from_url(arbeitnow::DEFAULT_URL)?),
        Box::new(WeWorkRemotelyProvider::from_url(
            weworkremotely_rss::DEFAULT_URL,
        )?),
    ])
}
