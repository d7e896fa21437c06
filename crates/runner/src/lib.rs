//! Vigil Runner - live market monitoring
//!
//! Keeps each symbol's daily series current, evaluates strategies on every
//! fresh intraday bar and fans the results out to subscribers:
//!
//! - **Config**: JSON application config with env overrides
//! - **Market Loop**: day-transition check, intraday merge, broadcast
//! - **Market Server**: per-symbol lifecycle and request accessors
//! - **Manager**: symbol -> server registry
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │    MarketManager     │
//!                    └──────────┬───────────┘
//!                               │ one per symbol
//!                    ┌──────────▼───────────┐
//!  TradingCalendar ─►│     MarketServer     │◄─ MarketDataSource
//!                    │   (MarketLoop task)  │
//!                    └──┬────────┬───────┬──┘
//!                       │        │       │
//!           SeriesStore ◄┘        │       └► Notifier ─► AlertChannel
//!                                │
//!                     AnalyticsRegistry
//!                                │
//!                   ┌────────────▼────────────┐
//!                   │ live / analytics-<name> │ ConnectionPools
//!                   └─────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod market_loop;
pub mod server;

// Re-export main types
pub use config::{AppConfig, DATA_DIR_ENV, ServerConfig, SourceConfig};
pub use error::{AppConfigError, ManagerError, Result, ServerError};
pub use manager::MarketManager;
pub use market_loop::{
    DayTransition, IterationOutcome, LoopSettings, MarketLoop, ServerDeps, SharedSeries,
};
pub use server::{MarketServer, ServerState};
