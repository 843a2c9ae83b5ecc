use std::path::PathBuf;

use thiserror::Error;

use crate::model::RecordId;

#[derive(Error, Debug)]
pub enum CardstockError {
    #[error("No page or card with id: {0}")]
    EntityNotFound(RecordId),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store lock could not be acquired within the configured deadline.
    /// Callers should surface this as a transient "try again" failure.
    #[error("Timed out after {waited_ms}ms waiting for store lock: {path}")]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, CardstockError>;
