// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::DigestPublisher;

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Reads SMTP_HOST, SMTP_USER, SMTP_PASS, DIGEST_EMAIL_FROM and
    /// DIGEST_EMAIL_TO.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr = std::env::var("DIGEST_EMAIL_FROM").context("DIGEST_EMAIL_FROM missing")?;
        let to_addr = std::env::var("DIGEST_EMAIL_TO").context("DIGEST_EMAIL_TO missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid DIGEST_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid DIGEST_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }
}

#[async_trait::async_trait]
impl DigestPublisher for EmailSender {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("build digest email")?;

        self.mailer.send(msg).await.context("send digest email")?;
        Ok(())
    }
}
