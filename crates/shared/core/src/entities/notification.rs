use crate::values::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Number of deliveries kept per (strategy, label) key
pub const LEDGER_DEPTH: usize = 2;

/// Alert produced by a strategy from its own result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Registered name of the strategy that produced it
    pub strategy: String,
    /// Signal category, possibly parametrised (`BUY_REMINDER_5.0%`)
    pub label: String,
    pub timestamp: Timestamp,
    pub message: String,
    /// Minimum spacing between two deliveries with the same strategy and label
    pub cooldown: Duration,
}

impl Notification {
    pub fn new(
        strategy: impl Into<String>,
        label: impl Into<String>,
        timestamp: Timestamp,
        message: impl Into<String>,
        cooldown: Duration,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            label: label.into(),
            timestamp,
            message: message.into(),
            cooldown,
        }
    }

    /// True if `previous` was delivered less than `self.cooldown` before `self`
    pub fn within_cooldown_of(&self, previous: &Notification) -> bool {
        let elapsed = self.timestamp - previous.timestamp;
        match chrono::Duration::from_std(self.cooldown) {
            Ok(cooldown) => elapsed < cooldown,
            // Cooldown too large to represent: always inside it
            Err(_) => true,
        }
    }
}

/// Delivery history, keyed by strategy then label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    entries: BTreeMap<String, BTreeMap<String, Vec<Notification>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent delivery for (strategy, label)
    pub fn last(&self, strategy: &str, label: &str) -> Option<&Notification> {
        self.entries
            .get(strategy)
            .and_then(|labels| labels.get(label))
            .and_then(|history| history.last())
    }

    /// All retained deliveries for (strategy, label), oldest first
    pub fn history(&self, strategy: &str, label: &str) -> &[Notification] {
        self.entries
            .get(strategy)
            .and_then(|labels| labels.get(label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a delivery and trim the key to the latest `LEDGER_DEPTH`
    pub fn record(&mut self, notification: Notification) {
        let history = self
            .entries
            .entry(notification.strategy.clone())
            .or_default()
            .entry(notification.label.clone())
            .or_default();
        history.push(notification);
        if history.len() > LEDGER_DEPTH {
            let excess = history.len() - LEDGER_DEPTH;
            history.drain(..excess);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
