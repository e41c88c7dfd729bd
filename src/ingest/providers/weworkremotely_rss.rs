// src/ingest/providers/weworkremotely_rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use super::Mode;
use crate::ingest::types::SourceProvider;
use crate::listing::{normalize_text, Listing};

pub const DEFAULT_URL: &str = "https://weworkremotely.com/categories/remote-programming-jobs.rss";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// WeWorkRemotely programming category feed (RSS). Everything there is remote.
pub struct WeWorkRemotelyProvider {
    mode: Mode,
}

impl WeWorkRemotelyProvider {
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
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing weworkremotely rss xml")?;

        Ok(rss
            .channel
            .item
            .into_iter()
            .map(|it| {
                let raw_title = normalize_text(it.title.as_deref().unwrap_or_default());
                let (company, title) = split_company_title(&raw_title);
                Listing {
                    source: "WeWorkRemotely".to_string(),
                    title,
                    company,
                    location: "Remote".to_string(),
                    url: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
                    tags: Vec::new(),
                    date: it.pub_date.unwrap_or_default(),
                    ..Default::default()
                }
            })
            .collect())
    }
}

/// Feed titles usually read "Company: Role". Without the separator the company stays empty.
fn split_company_title(raw: &str) -> (String, String) {
    match raw.split_once(": ") {
        Some((company, title)) if !company.trim().is_empty() && !title.trim().is_empty() => {
            (company.trim().to_string(), title.trim().to_string())
        }
        _ => (String::new(), raw.to_string()),
    }
}

#[async_trait]
impl SourceProvider for WeWorkRemotelyProvider {
    async fn fetch_latest(&self) -> Result<Vec<Listing>> {
        let body = self.mode.body(self.name()).await?;
        Self::parse(&body)
    }

    fn name(&self) -> &'static str {
        "WeWorkRemotely"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_company_prefix() {
        assert_eq!(
            split_company_title("Acme: Data Science Intern"),
            ("Acme".to_string(), "Data Science Intern".to_string())
        );
        assert_eq!(
            split_company_title("Data Science Intern"),
            (String::new(), "Data Science Intern".to_string())
        );
        assert_eq!(
            split_company_title(": Intern"),
            (String::new(), ": Intern".to_string())
        );
    }
}
