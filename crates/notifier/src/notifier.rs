use crate::error::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use vigil_core::{Ledger, Notification};
use vigil_ports::{AlertChannel, LedgerStore};

/// Per-symbol notification gate
///
/// The ledger is loaded once on open and persisted on every delivery.
pub struct Notifier {
    symbol: String,
    recipients: Vec<String>,
    ledger: Mutex<Ledger>,
    store: Arc<dyn LedgerStore>,
    channel: Arc<dyn AlertChannel>,
}

impl Notifier {
    /// Open the notifier, restoring the persisted ledger. An unreadable
    /// ledger starts empty.
    pub async fn open(
        symbol: impl Into<String>,
        recipients: Vec<String>,
        store: Arc<dyn LedgerStore>,
        channel: Arc<dyn AlertChannel>,
    ) -> Self {
        let symbol = symbol.into();
        let ledger = match store.load().await {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("[{}] Discarding unreadable notification ledger: {}", symbol, e);
                Ledger::new()
            }
        };
        Self {
            symbol,
            recipients,
            ledger: Mutex::new(ledger),
            store,
            channel,
        }
    }

    /// Deliver `notification` unless its cooldown has not elapsed since the
    /// previous delivery with the same strategy and label.
    ///
    /// Returns `Ok(false)` when suppressed, `Ok(true)` when recorded and
    /// dispatched.
    pub async fn register(&self, notification: Notification) -> Result<bool> {
        {
            let mut ledger = self.ledger.lock().await;
            if let Some(previous) = ledger.last(&notification.strategy, &notification.label) {
                if notification.within_cooldown_of(previous) {
                    debug!(
                        "[{}] Suppressed {}/{} (cooldown {:?})",
                        self.symbol, notification.strategy, notification.label, notification.cooldown
                    );
                    return Ok(false);
                }
            }
            ledger.record(notification.clone());
            self.store.save(&ledger).await?;
        }

        let subject = format!(
            "[{}] {} {}",
            self.symbol, notification.strategy, notification.label
        );
        self.channel
            .send(&self.recipients, &subject, &notification.message)
            .await?;
        info!("[{}] Notification sent: {}", self.symbol, subject);
        Ok(true)
    }

    /// Most recent delivery for (strategy, label)
    pub async fn last(&self, strategy: &str, label: &str) -> Option<Notification> {
        self.ledger.lock().await.last(strategy, label).cloned()
    }

    /// Flush the ledger to its store
    pub async fn close(&self) -> Result<()> {
        let ledger = self.ledger.lock().await;
        self.store.save(&ledger).await?;
        debug!("[{}] Notification ledger flushed", self.symbol);
        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}
