// lib/src/errors.rs

use thiserror::Error;

use bincode::error::{DecodeError, EncodeError};
use models::errors::ValidationError;
use sled::transaction::TransactionError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Bincode decode error: {0}")]
    BincodeDecode(#[from] DecodeError),
    #[error("Bincode encode error: {0}")]
    BincodeEncode(#[from] EncodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

impl From<TransactionError<StorageError>> for StorageError {
    fn from(err: TransactionError<StorageError>) -> Self {
        match err {
            TransactionError::Abort(err) => err,
            TransactionError::Storage(err) => err.into(),
        }
    }
}

impl From<::config::ConfigError> for StorageError {
    fn from(err: ::config::ConfigError) -> Self {
        StorageError::ConfigurationError(err.to_string())
    }
}
