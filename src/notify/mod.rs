//! Notification sinks for the published digest.
//!
//! Every sink is optional: an unconfigured sink is skipped, a failing one is
//! logged and counted. Nothing here can fail a run.

pub mod email;
pub mod slack;
pub mod telegram;
pub mod webhook_email;

use anyhow::Result;
use metrics::counter;

pub use email::SmtpEmailNotifier;
pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;
pub use webhook_email::WebhookEmailNotifier;

pub const TRUNCATION_MARKER: &str = "\n\n[Truncated]\n";

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
    fn name(&self) -> &'static str;
    fn is_configured(&self) -> bool {
        true
    }
}

/// Cut `body` to `max_chars` characters and append [`TRUNCATION_MARKER`]; unchanged if it fits.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        None => body.to_string(),
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &body[..byte_idx]),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifySummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fans one digest out to every sink, in order.
#[derive(Default)]
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(sinks: Vec<Box<dyn Notifier>>) -> Self {
        Self { sinks }
    }

    /// Webhook email, SMTP email, Telegram and Slack, each configured from env.
    pub fn from_env() -> Self {
        let mut sinks: Vec<Box<dyn Notifier>> = vec![Box::new(WebhookEmailNotifier::from_env())];
        if let Some(smtp) = SmtpEmailNotifier::from_env() {
            sinks.push(Box::new(smtp));
        }
        sinks.push(Box::new(TelegramNotifier::from_env()));
        sinks.push(Box::new(SlackNotifier::from_env()));
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn notify_all(&self, subject: &str, body: &str) -> NotifySummary {
        let mut summary = NotifySummary::default();
        for sink in &self.sinks {
            if !sink.is_configured() {
                tracing::debug!(sink = sink.name(), "notifier not configured, skipping");
                summary.skipped += 1;
                continue;
            }
            match sink.send(subject, body).await {
                Ok(()) => {
                    tracing::info!(sink = sink.name(), "notification sent");
                    summary.sent += 1;
                }
                Err(e) => {
                    tracing::warn!(error = ?e, sink = sink.name(), "notification failed");
                    counter!("digest_notify_errors_total", "sink" => sink.name()).increment(1);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Recording {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
        configured: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for Recording {
        async fn send(&self, subject: &str, _body: &str) -> Result<()> {
            self.calls.lock().push(subject.to_string());
            if self.fail {
                Err(anyhow!("boom"))
            } else {
                Ok(())
            }
        }
        fn name(&self) -> &'static str {
            "recording"
        }
        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("hello", 5), "hello");
        assert_eq!(truncate_body("hello", 3), format!("hel{TRUNCATION_MARKER}"));
        // multi-byte chars are cut on char boundaries
        assert_eq!(truncate_body("ééé", 2), format!("éé{TRUNCATION_MARKER}"));
    }

    #[tokio::test]
    async fn failures_and_unconfigured_sinks_do_not_stop_fanout() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mk = |fail, configured| -> Box<dyn Notifier> {
            Box::new(Recording {
                calls: calls.clone(),
                fail,
                configured,
            })
        };
        let mux = NotifierMux::new(vec![mk(true, true), mk(false, false), mk(false, true)]);
        let s = mux.notify_all("subj", "body").await;
        assert_eq!(s, NotifySummary { sent: 1, skipped: 1, failed: 1 });
        assert_eq!(calls.lock().len(), 2);
    }

    const SINK_ENV: &[&str] = &[
        "MAIL_WEBHOOK_URL",
        "MAIL_TO",
        "SMTP_HOST",
        "SMTP_USER",
        "SMTP_PASS",
        "NOTIFY_EMAIL_FROM",
        "NOTIFY_EMAIL_TO",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
        "SLACK_WEBHOOK_URL",
    ];

    fn clear_sink_env() {
        for k in SINK_ENV {
            std::env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn sinks_without_env_are_unconfigured() {
        clear_sink_env();
        assert!(!WebhookEmailNotifier::from_env().is_configured());
        assert!(!TelegramNotifier::from_env().is_configured());
        assert!(!SlackNotifier::from_env().is_configured());
        assert!(SmtpEmailNotifier::from_env().is_none());

        // half-configured counts as unconfigured
        std::env::set_var("MAIL_WEBHOOK_URL", "https://relay.test/exec");
        std::env::set_var("TELEGRAM_CHAT_ID", "42");
        assert!(!WebhookEmailNotifier::from_env().is_configured());
        assert!(!TelegramNotifier::from_env().is_configured());
        clear_sink_env();
    }

    #[serial_test::serial]
    #[tokio::test]
    async fn unconfigured_mux_skips_every_sink() {
        clear_sink_env();
        let mux = NotifierMux::from_env();
        assert_eq!(mux.len(), 3);
        let s = mux.notify_all("subj", "body").await;
        assert_eq!(
            s,
            NotifySummary {
                sent: 0,
                skipped: mux.len(),
                failed: 0
            }
        );
    }
}
