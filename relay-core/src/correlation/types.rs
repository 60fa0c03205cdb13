use std::collections::HashSet;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use super::IdentityRecord;

/// `StoreError` provides all specific error types relate with the correlation store
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("serialize error: {0}")]
    SerializeError(String),

    #[error("unserialize error: {0}")]
    UnserializeError(String),
}

/// `DuplicateDidPolicy` decides what `upsert_identity` does when the submitted DID
/// equals the current one
///
/// - [`DuplicateDidPolicy::Archive`] keeps the literal behavior, the unchanged DID
///   is archived into the history again
/// - [`DuplicateDidPolicy::Skip`] turns the call into a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDidPolicy {
    #[default]
    Archive,
    Skip,
}

/// `ExchangeHint` pairs a credential definition with the connection it was offered on
///
/// Hints are stored per connection id (or exchange token), so many exchanges can be
/// in flight at the same time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ExchangeHint {
    pub credential_definition_id: String,
    pub connection_id: String,
}

impl ExchangeHint {
    pub fn new(credential_definition_id: String, connection_id: String) -> Self {
        Self {
            credential_definition_id,
            connection_id,
        }
    }
}

/// `ConnectionRecord` remembers who sits at the other end of an agent connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionRecord {
    pub connection_id: String,
    pub name: String,
    pub subject_did: String,
}

impl ConnectionRecord {
    pub fn new(connection_id: String, name: String, subject_did: String) -> Self {
        Self {
            connection_id,
            name,
            subject_did,
        }
    }
}

/// `RepoBuilder` is the persistence seam used by the correlation store
///
/// Only identities, trusted issuers and verified data are durable. Implementers must not
/// call back into the store, the store invokes these methods while it holds the lock of the
/// map being persisted.
#[async_trait]
pub trait RepoBuilder: Send + Sync {
    async fn save_identity(&self, identity: &IdentityRecord) -> Result<(), StoreError>;
    async fn list_identities(&self) -> Result<Vec<IdentityRecord>, StoreError>;

    async fn save_trusted_issuers(&self, issuers: &HashSet<String>) -> Result<(), StoreError>;
    async fn list_trusted_issuers(&self) -> Result<HashSet<String>, StoreError>;

    async fn save_verified_data(&self, id: String, data: &Value) -> Result<(), StoreError>;
    async fn get_verified_data(&self, id: String) -> Result<Option<Value>, StoreError>;
}
