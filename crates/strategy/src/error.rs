use thiserror::Error;

/// Invalid strategy parameters, raised at construction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Malformed duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Unknown duration unit '{unit}' in '{value}'")]
    UnknownUnit { value: String, unit: String },

    #[error("Unparseable strategy config: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failures surfaced by the analytics registry
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Strategy '{strategy}' failed: {reason}")]
    Execution { strategy: String, reason: String },

    #[error("Result of type '{found}' handed to strategy '{strategy}'")]
    ResultMismatch { strategy: String, found: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
