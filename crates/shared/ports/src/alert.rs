use crate::error::AlertError;
use async_trait::async_trait;

/// Outbound alert delivery (email, chat, log, ...)
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn send(&self, recipients: &[String], subject: &str, body: &str)
    -> Result<(), AlertError>;
}
