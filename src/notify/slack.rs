use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{truncate_body, Notifier};

const MAX_TEXT_CHARS: usize = 15_000;

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            client: Client::new(),
        }
    }

    /// Optional builder for tests/tools
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return Ok(());
        };

        let text = format!("*{subject}*\n{}", truncate_body(body, MAX_TEXT_CHARS));
        let payload = serde_json::json!({ "text": text });

        self.client
            .post(url)
            .timeout(Duration::from_secs(20))
            .json(&payload)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}
