//! Error types for the runner crate

use thiserror::Error;
use vigil_ports::{SourceError, StoreError};
use vigil_strategy::{AnalyticsError, ConfigError};

/// Market server failures
///
/// `NotReady` and `NotFound` are what request-boundary accessors surface;
/// the remaining variants stay inside the polling loop, where they are
/// logged and the affected step is skipped.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("No data available for {0}")]
    NoData(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Manager-level failures
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] AppConfigError),
}

/// Configuration loading and validation failures; fatal at startup
#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Failed to read config {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Invalid strategy config: {0}")]
    Strategy(#[from] ConfigError),
}
