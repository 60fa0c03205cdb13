use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::{DuplicateDidPolicy, StoreError};

/// `IdentityRecord` represents one credential subject over time
///
/// The `history` is an append-only audit trail of every DID that used to be current,
/// oldest first. A record is never deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct IdentityRecord {
    pub(crate) name: String,
    pub(crate) current_did: String,
    pub(crate) history: Vec<String>,

    #[serde(with = "ts_seconds")]
    pub(crate) created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    pub(crate) updated_at: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(name: String, current_did: String) -> Self {
        Self {
            name,
            current_did,
            history: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// `rotate` archives the current DID and installs the given one
    ///
    /// Returns `false` when nothing changed, which only happens with
    /// [`DuplicateDidPolicy::Skip`] and an unchanged DID
    pub fn rotate(&mut self, did: String, policy: DuplicateDidPolicy) -> bool {
        if did == self.current_did && policy == DuplicateDidPolicy::Skip {
            return false;
        }

        let previous = std::mem::replace(&mut self.current_did, did);
        self.history.push(previous);
        self.updated_at = Utc::now();
        true
    }

    pub fn get_name(&self) -> String {
        self.name.to_owned()
    }

    pub fn get_current_did(&self) -> String {
        self.current_did.to_owned()
    }

    pub fn get_history(&self) -> Vec<String> {
        self.history.to_owned()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ToJSON for IdentityRecord {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for IdentityRecord {
    type Error = StoreError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json =
            serde_json::to_vec(&self).map_err(|err| StoreError::SerializeError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for IdentityRecord {
    type Error = StoreError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let identity: IdentityRecord = serde_json::from_slice(&value)
            .map_err(|err| StoreError::UnserializeError(err.to_string()))?;
        Ok(identity)
    }
}
