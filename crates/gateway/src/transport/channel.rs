//! Tokio channel-backed subscriber connection
//!
//! Payloads are forwarded into an mpsc channel whose receiver is owned by
//! the subscriber side (a websocket writer task, a test, ...). Sends never
//! wait: a full channel means the subscriber stopped reading, and both a
//! full channel and a dropped receiver fail the send, which gets the
//! connection pruned.

use crate::error::TransportError;
use crate::transport::{Connection, ConnectionId};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

pub struct ChannelConnection {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl ChannelConnection {
    /// Wrap an existing sender
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    /// Create a connection and the receiver its payloads arrive on
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: &str) -> Result<(), TransportError> {
        self.tx
            .try_send(payload.to_string())
            .map_err(|e| match e {
                TrySendError::Full(_) => {
                    TransportError::Send(format!("subscriber {} is not reading", self.id))
                }
                TrySendError::Closed(_) => TransportError::ChannelClosed,
            })
    }
}
