// src/ingest/providers/arbeitnow.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::Mode;
use crate::ingest::types::SourceProvider;
use crate::listing::{normalize_text, Listing};

pub const DEFAULT_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    data: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct Job {
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    url: Option<String>,
    tags: Option<Vec<String>>,
    // unix seconds on the live API
    created_at: Option<serde_json::Value>,
}

/// Arbeitnow job board API (JSON).
pub struct ArbeitnowProvider {
    mode: Mode,
}

impl ArbeitnowProvider {
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
        let payload: Payload = serde_json::from_str(s).context("parsing arbeitnow json")?;
        Ok(payload
            .data
            .into_iter()
            .map(|j| Listing {
                source: "Arbeitnow".to_string(),
                title: normalize_text(j.title.as_deref().unwrap_or_default()),
                company: normalize_text(j.company_name.as_deref().unwrap_or_default()),
                location: normalize_text(j.location.as_deref().unwrap_or_default()),
                url: j.url.unwrap_or_default(),
                tags: j.tags.unwrap_or_default(),
                date: match j.created_at {
                    Some(serde_json::Value::String(s)) => s,
                    Some(serde_json::Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
                ..Default::default()
            })
            .collect())
    }
}

#[async_trait]
impl SourceProvider for ArbeitnowProvider {
    async fn fetch_latest(&self) -> Result<Vec<Listing>> {
        let body = self.mode.body(self.name()).await?;
        Self::parse(&body)
    }

    fn name(&self) -> &'static str {
        "Arbeitnow"
    }
}
