//! Error types for the gateway crate

use thiserror::Error;
use vigil_ports::SourceError;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("Send timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Gateway-level errors (adapter operations)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Message conversion error: {0}")]
    Conversion(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Connection(e.to_string())
    }
}

impl From<GatewayError> for SourceError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Connection(msg) => SourceError::Unreachable(msg),
            GatewayError::UnknownSymbol(symbol) => SourceError::UnknownSymbol(symbol),
            other => SourceError::InvalidResponse(other.to_string()),
        }
    }
}
