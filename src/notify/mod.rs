// src/notify/mod.rs
pub mod email;

use anyhow::Result;

pub use email::EmailSender;

/// Transmits one rendered digest. The pipeline does not care how.
#[async_trait::async_trait]
pub trait DigestPublisher: Send + Sync {
    async fn publish(&self, subject: &str, body: &str) -> Result<()>;
}
