use async_trait::async_trait;
use log::info;
use vigil_ports::{AlertChannel, AlertError};

/// Alert channel that writes outbound alerts to the log
#[derive(Debug, Clone, Default)]
pub struct LogAlertChannel;

impl LogAlertChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertChannel for LogAlertChannel {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), AlertError> {
        info!(
            "[EMAIL OUT] to: {} | subject: {} | {}",
            recipients.join(", "),
            subject,
            body
        );
        Ok(())
    }
}
