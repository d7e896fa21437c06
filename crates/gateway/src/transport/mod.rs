//! Subscriber transport
//!
//! A `Connection` is one live subscriber. Connections are grouped in named
//! pools (`live`, `analytics-<strategy>`) and reached only through
//! `ConnectionPools::push`.

pub mod channel;
pub mod config;
pub mod pool;

pub use config::Pools;

use crate::error::TransportError;
use async_trait::async_trait;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// A subscriber able to receive serialized payloads
#[async_trait]
pub trait Connection: Send + Sync {
    /// Stable identity used for unregistering and pruning
    fn id(&self) -> ConnectionId;

    /// Deliver one payload
    async fn send(&self, payload: &str) -> Result<(), TransportError>;
}
