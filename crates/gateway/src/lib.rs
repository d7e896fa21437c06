//! Vigil Gateway
//!
//! Edge of the Vigil system. Provides:
//! - Subscriber connection pools with push-and-prune fan-out
//! - Wire message types for live and analytics updates
//! - Market data adapters (Yahoo Finance)
//!
//! ## Architecture
//!
//! ```text
//! Yahoo Finance ──HTTP──► YahooFinanceSource ──► MarketServer (per symbol)
//!                                                      │
//!                                                      │ Pools:
//!                                                      │ live, analytics-{strategy}
//!                                                 ┌────▼────┐
//!                                                 │  Pools  │──► Connection (ws, channel, ...)
//!                                                 └─────────┘
//! ```
//!
//! ## Transport
//!
//! Subscribers are reached through the `Connection` trait. The in-process
//! `ChannelConnection` forwards serialized payloads into an mpsc channel, the
//! same shape a websocket writer task consumes.

pub mod adapters;
pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use adapters::yahoo::{DEFAULT_BASE_URL, YahooFinanceSource};
pub use error::{GatewayError, TransportError};
pub use messages::market_data::{AnalyticsUpdate, LiveUpdate, Ohlcv};
pub use transport::{
    Connection, ConnectionId, Pools,
    channel::ChannelConnection,
    pool::{ConnectionPools, DEFAULT_SEND_TIMEOUT, PushOutcome},
};
