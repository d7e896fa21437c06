use thiserror::Error;

/// Failures of a market data source or trading calendar
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Calendar error: {0}")]
    Calendar(String),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Failures of durable storage
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures delivering an alert
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("No recipients configured")]
    NoRecipients,

    #[error("Delivery failed: {0}")]
    Delivery(String),
}
