// src/notify/telegram.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{truncate_body, Notifier};

/// Telegram caps messages at 4096 chars; leave room for the marker.
pub const MAX_MESSAGE_CHARS: usize = 4_000;

const API_BASE: &str = "https://api.telegram.org";

/// Chat-style sink: posts the digest to one Telegram chat through a bot.
pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            chat_id: non_empty("TELEGRAM_CHAT_ID"),
            api_base: API_BASE.to_string(),
            client: Client::new(),
        }
    }

    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token: Some(bot_token),
            chat_id: Some(chat_id),
            api_base: API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Point at a different Bot API host (self-hosted server, tests).
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn message_text(subject: &str, body: &str) -> String {
        // the report already opens with its dated title
        let text = if body.contains(subject) {
            body.to_string()
        } else {
            format!("{subject}\n\n{body}")
        };
        truncate_body(&text, MAX_MESSAGE_CHARS)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            tracing::debug!("Telegram disabled (no TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID)");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": Self::message_text(subject, body),
            "disable_web_page_preview": true,
        });

        self.client
            .post(url)
            .timeout(Duration::from_secs(20))
            .json(&payload)
            .send()
            .await
            .context("telegram sendMessage")?
            .error_for_status()
            .context("telegram non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }

    fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_digests_are_truncated() {
        let body = "x".repeat(MAX_MESSAGE_CHARS + 50);
        let text = TelegramNotifier::message_text("Digest", &body);
        assert!(text.ends_with(super::super::TRUNCATION_MARKER));
        assert!(text.chars().count() <= MAX_MESSAGE_CHARS + super::super::TRUNCATION_MARKER.len());
    }

    #[test]
    fn subject_not_repeated_when_in_body() {
        let text = TelegramNotifier::message_text("Digest - 2025", "# Digest - 2025\nbody");
        assert_eq!(text, "# Digest - 2025\nbody");
    }
}
