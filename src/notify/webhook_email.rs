// src/notify/webhook_email.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{truncate_body, Notifier};

pub const MAX_BODY_CHARS: usize = 15_000;

/// Email via an HTTP relay (e.g. a Google Apps Script web app) taking `{to, subject, body}`.
pub struct WebhookEmailNotifier {
    webhook_url: Option<String>,
    to: Option<String>,
    client: Client,
    timeout: Duration,
}

impl WebhookEmailNotifier {
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            webhook_url: non_empty("MAIL_WEBHOOK_URL"),
            to: non_empty("MAIL_TO"),
            client: Client::new(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn new(webhook_url: String, to: String) -> Self {
        Self {
            webhook_url: Some(webhook_url),
            to: Some(to),
            client: Client::new(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Relay request body `{to, subject, body}`, body capped at [`MAX_BODY_CHARS`].
    pub fn payload(&self, subject: &str, body: &str) -> serde_json::Value {
        serde_json::json!({
            "to": self.to.as_deref().unwrap_or_default(),
            "subject": subject,
            "body": truncate_body(body, MAX_BODY_CHARS),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookEmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let (Some(url), Some(_)) = (&self.webhook_url, &self.to) else {
            tracing::debug!("Mail webhook disabled (no MAIL_WEBHOOK_URL / MAIL_TO)");
            return Ok(());
        };

        let payload = self.payload(subject, body);

        self.client
            .post(url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("mail webhook post")?
            .error_for_status()
            .context("mail webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mail-webhook"
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.is_some() && self.to.is_some()
    }
}
