//! Named subscriber pools with push-and-prune delivery

use crate::error::TransportError;
use crate::transport::{Connection, ConnectionId, Pools};
use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Longest a single member may take to accept a payload
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of one push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    pub delivered: usize,
    pub pruned: usize,
}

/// Pool name -> members
///
/// Membership changes only through `register`/`unregister` and pruning of
/// members whose send failed or timed out. Pools are emptied, never removed.
pub struct ConnectionPools {
    pools: DashMap<String, Vec<Arc<dyn Connection>>>,
    send_timeout: Duration,
}

impl Default for ConnectionPools {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPools {
    /// Pools with an empty `live` pool
    pub fn new() -> Self {
        Self::with_send_timeout(DEFAULT_SEND_TIMEOUT)
    }

    pub fn with_send_timeout(send_timeout: Duration) -> Self {
        let pools = DashMap::new();
        pools.insert(Pools::LIVE.to_string(), Vec::new());
        Self {
            pools,
            send_timeout,
        }
    }

    /// Add a connection to `pool`, creating the pool on first use
    pub fn register(&self, pool: &str, connection: Arc<dyn Connection>) {
        let mut members = self.pools.entry(pool.to_string()).or_default();
        if !members.iter().any(|c| c.id() == connection.id()) {
            debug!("Connection {} joined {}", connection.id(), pool);
            members.push(connection);
        }
    }

    /// Remove a connection; returns whether it was a member
    pub fn unregister(&self, pool: &str, id: ConnectionId) -> bool {
        let Some(mut members) = self.pools.get_mut(pool) else {
            return false;
        };
        let before = members.len();
        members.retain(|c| c.id() != id);
        before != members.len()
    }

    /// Deliver `payload` to every member of `pool`
    ///
    /// Members are snapshotted before sending; the ones whose send failed or
    /// exceeded the send timeout are removed afterwards by id, so concurrent
    /// registration is tolerated.
    pub async fn push(&self, pool: &str, payload: &str) -> PushOutcome {
        let members: Vec<Arc<dyn Connection>> = match self.pools.get(pool) {
            Some(members) => members.value().clone(),
            None => return PushOutcome::default(),
        };
        if members.is_empty() {
            return PushOutcome::default();
        }

        let mut failed = Vec::new();
        for connection in &members {
            let sent = tokio::time::timeout(self.send_timeout, connection.send(payload))
                .await
                .unwrap_or(Err(TransportError::Timeout(self.send_timeout)));
            if let Err(e) = sent {
                warn!("Dropping connection {} from {}: {}", connection.id(), pool, e);
                failed.push(connection.id());
            }
        }

        let mut pruned = 0;
        if !failed.is_empty() {
            if let Some(mut current) = self.pools.get_mut(pool) {
                let before = current.len();
                current.retain(|c| !failed.contains(&c.id()));
                pruned = before - current.len();
            }
        }

        PushOutcome {
            delivered: members.len() - failed.len(),
            pruned,
        }
    }

    /// Names of every pool, sorted
    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Member count of `pool`, zero when it does not exist
    pub fn len(&self, pool: &str) -> usize {
        self.pools.get(pool).map_or(0, |members| members.len())
    }

    /// Strategies whose analytics pool currently has members, sorted
    pub fn subscribed_strategies(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pools
            .iter()
            .filter(|e| !e.value().is_empty())
            .filter_map(|e| Pools::strategy_of(e.key()).map(str::to_string))
            .collect();
        names.sort();
        names
    }
}
