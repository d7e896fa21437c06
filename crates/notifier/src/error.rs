use thiserror::Error;
use vigil_ports::{AlertError, StoreError};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to persist notification ledger: {0}")]
    Persist(#[from] StoreError),

    #[error("Failed to dispatch notification: {0}")]
    Dispatch(#[from] AlertError),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
