// src/ingest/providers/remotive.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::Mode;
use crate::ingest::types::SourceProvider;
use crate::listing::{normalize_text, Listing};

pub const DEFAULT_URL: &str = "https://remotive.com/api/remote-jobs";

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct Job {
    title: Option<String>,
    company_name: Option<String>,
    candidate_required_location: Option<String>,
    url: Option<String>,
    tags: Option<Vec<String>>,
    publication_date: Option<String>,
}

/// Remotive public API (remote jobs, JSON).
pub struct RemotiveProvider {
    mode: Mode,
}

impl RemotiveProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        Ok(Self {
            mode: Mode::http(url)?,
        })
    }

    fn parse(s: &str) -> Result<Vec<Listing>> {
        let payload: Payload = serde_json::from_str(s).context("parsing remotive json")?;
        Ok(payload
            .jobs
            .into_iter()
            .map(|j| Listing {
                source: "Remotive".to_string(),
                title: normalize_text(j.title.as_deref().unwrap_or_default()),
                company: normalize_text(j.company_name.as_deref().unwrap_or_default()),
                location: normalize_text(
                    j.candidate_required_location.as_deref().unwrap_or_default(),
                ),
                url: j.url.unwrap_or_default(),
                tags: j.tags.unwrap_or_default(),
                date: j.publication_date.unwrap_or_default(),
                ..Default::default()
            })
            .collect())
    }
}

#[async_trait]
impl SourceProvider for RemotiveProvider {
    async fn fetch_latest(&self) -> Result<Vec<Listing>> {
        let body = self.mode.body(self.name()).await?;
        Self::parse(&body)
    }

    fn name(&self) -> &'static str {
        "Remotive"
    }
}
