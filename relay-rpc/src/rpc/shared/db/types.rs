use rst_common::with_errors::thiserror::{self, Error};

use ssi_relay_core::correlation::types::StoreError;

/// `DbError` reports values that could not cross the RocksDB byte boundary
#[derive(Error, PartialEq, Debug)]
pub enum DbError {
    #[error("bucket encode error: {0}")]
    EncodeError(String),

    #[error("bucket decode error: {0}")]
    DecodeError(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::EncodeError(msg) => StoreError::SerializeError(msg),
            DbError::DecodeError(msg) => StoreError::UnserializeError(msg),
        }
    }
}
