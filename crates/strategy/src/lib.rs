//! Vigil Analytics
//!
//! Strategies computed over a symbol's daily series, and the registry the
//! market servers dispatch through.
//!
//! ## Architecture
//!
//! ```text
//!   analytics-<name> pool subscribed
//!              │
//!              ▼
//!   AnalyticsRegistry::execute(name, series, symbol, streaming)
//!              │
//!              ├── Strategy::compute ───────────────► StrategyResult ──► broadcast
//!              │
//!              └── Strategy::generate_notifications ► Option<Notification> ──► Notifier
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vigil_strategy::{AnalyticsConfig, AnalyticsRegistry};
//!
//! let registry = AnalyticsRegistry::from_config(&config.analytics, clock)?;
//! let (result, notification) = registry.execute("sma", &series, "^GSPC", true)?;
//! ```

pub mod cooldown;
pub mod dummy;
pub mod error;
pub mod registry;
pub mod sma;
pub mod strategy;

// Re-export main types
pub use cooldown::{CooldownSpec, Cooldowns, DEFAULT_COOLDOWN, parse_duration};
pub use dummy::{DummyConfig, DummyResult, DummyStrategy};
pub use error::{AnalyticsError, ConfigError, Result};
pub use registry::{AnalyticsConfig, AnalyticsRegistry};
pub use sma::{DEFAULT_REMINDERS, SmaConfig, SmaPoint, SmaResult, SmaThreshold};
pub use strategy::{NotificationContext, Signal, Strategy, StrategyResult};
