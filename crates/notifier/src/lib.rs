//! Vigil Notifier
//!
//! Deduplicates strategy notifications per (strategy, label) with the
//! cooldown each notification carries, keeps a durable delivery ledger
//! and dispatches through an alert channel.
//!
//! ```text
//! Notification ──► cooldown check ──suppressed──► Ok(false)
//!                       │
//!                       ▼
//!                 ledger.record ──► LedgerStore::save ──► AlertChannel::send ──► Ok(true)
//! ```

pub mod channel;
pub mod error;
pub mod notifier;

pub use channel::LogAlertChannel;
pub use error::{NotifyError, Result};
pub use notifier::Notifier;
