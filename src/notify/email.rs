// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{truncate_body, Notifier};
use crate::notify::webhook_email::MAX_BODY_CHARS;

/// Plain-text digest over SMTP.
pub struct SmtpEmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpEmailNotifier {
    /// `None` unless `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`, `NOTIFY_EMAIL_FROM` and
    /// `NOTIFY_EMAIL_TO` are all set and valid.
    pub fn from_env() -> Option<Self> {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        let host = var("SMTP_HOST")?;
        let user = var("SMTP_USER")?;
        let pass = var("SMTP_PASS")?;
        let from_addr = var("NOTIFY_EMAIL_FROM")?;
        let to_addr = var("NOTIFY_EMAIL_TO")?;

        match Self::build(&host, user, pass, &from_addr, &to_addr) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(error = ?e, "SMTP notifier misconfigured, disabled");
                None
            }
        }
    }

    fn build(host: &str, user: String, pass: String, from: &str, to: &str) -> Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .context("invalid SMTP_HOST")?
            .credentials(Credentials::new(user, pass))
            .timeout(Some(std::time::Duration::from_secs(20)))
            .build();
        Ok(Self {
            mailer,
            from: from.parse().context("invalid NOTIFY_EMAIL_FROM")?,
            to: to.parse().context("invalid NOTIFY_EMAIL_TO")?,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpEmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(truncate_body(body, MAX_BODY_CHARS))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
