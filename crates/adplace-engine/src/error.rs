use adplace_core::AdId;
use adplace_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Caller asked for an ad the store does not know
    #[error("Unknown ad: {0}")]
    UnknownAd(AdId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
