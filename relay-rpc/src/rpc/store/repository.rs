use std::collections::HashSet;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::{self, Value};

use rstdev_storage::engine::rocksdb::executor::Executor;
use rstdev_storage::engine::rocksdb::types::{
    Instruction as DbInstruction, OutputOpts as DbOutput,
};

use ssi_relay_core::correlation::types::{RepoBuilder, StoreError};
use ssi_relay_core::correlation::IdentityRecord;

use crate::rpc::shared::db::{Bucket as DbBucket, MERGE_NAMES_PREFIX};

const IDENTITY_KEY: &str = "identity";
const IDENTITY_INDEX_KEY: &str = "identity_index";
const TRUSTED_ISSUERS_KEY: &str = "trusted_issuers";
const VERIFIED_DATA_KEY: &str = "verified_data";

/// `Repository` persists the correlation store into RocksDB
///
/// Every identity lives under its own key, the list of known names is kept in a bucket
/// grown through the merge operator so the store can load all of them at startup
#[derive(Clone)]
pub struct Repository {
    db: Executor,
}

impl Repository {
    pub fn new(db: Executor) -> Self {
        Self { db }
    }

    fn build_key(&self, prefix: &str, val: String) -> String {
        format!("{}:{}", prefix, val)
    }

    fn build_index_key(&self) -> String {
        self.build_key(MERGE_NAMES_PREFIX, IDENTITY_INDEX_KEY.to_string())
    }

    async fn get_bytes(&self, key: String) -> Result<Option<Vec<u8>>, StoreError> {
        let output = self
            .db
            .exec(DbInstruction::GetCf { key })
            .await
            .map_err(|err| StoreError::StorageError(err.to_string()))?;

        match output {
            DbOutput::SingleByte { value } => Ok(value),
            _ => Err(StoreError::StorageError(
                "unknown output type".to_string(),
            )),
        }
    }

    async fn save_bytes(&self, key: String, value: Vec<u8>) -> Result<(), StoreError> {
        let _ = self
            .db
            .exec(DbInstruction::SaveCf { key, value })
            .await
            .map_err(|err| StoreError::StorageError(err.to_string()))?;

        Ok(())
    }

    async fn get_bucket(&self, key: String) -> Result<DbBucket<String>, StoreError> {
        let bucket = match self.get_bytes(key).await? {
            Some(bytes) => DbBucket::try_from(bytes)?,
            None => DbBucket::new(),
        };

        Ok(bucket)
    }

    async fn save_bucket(&self, key: String, bucket: DbBucket<String>) -> Result<(), StoreError> {
        let bytes: Vec<u8> = bucket.try_into().map_err(StoreError::from)?;

        self.save_bytes(key, bytes).await
    }
}

#[async_trait]
impl RepoBuilder for Repository {
    async fn save_identity(&self, identity: &IdentityRecord) -> Result<(), StoreError> {
        let identity_bytes: Vec<u8> = identity.to_owned().try_into()?;
        let key = self.build_key(IDENTITY_KEY, identity.get_name());
        self.save_bytes(key, identity_bytes).await?;

        let _ = self
            .db
            .exec(DbInstruction::MergeCf {
                key: self.build_index_key(),
                value: identity.get_name().into_bytes(),
            })
            .await
            .map_err(|err| StoreError::StorageError(err.to_string()))?;

        Ok(())
    }

    async fn list_identities(&self) -> Result<Vec<IdentityRecord>, StoreError> {
        let index = self.get_bucket(self.build_index_key()).await?;
        let names = index.items();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let keys = names
            .into_iter()
            .map(|name| self.build_key(IDENTITY_KEY, name))
            .collect();

        let output = self
            .db
            .exec(DbInstruction::MultiGetCf { keys })
            .await
            .map_err(|err| StoreError::StorageError(err.to_string()))?;

        let values = match output {
            DbOutput::MultiBytes { values } => Ok(values),
            _ => Err(StoreError::StorageError(
                "unknown output type".to_string(),
            )),
        }?;

        let mut identities = Vec::new();
        for value in values {
            let bytes = value
                .map_err(|err| StoreError::StorageError(err.to_string()))?
                .ok_or(StoreError::NotFound(
                    "indexed identity is missing".to_string(),
                ))?;

            identities.push(IdentityRecord::try_from(bytes)?);
        }

        Ok(identities)
    }

    async fn save_trusted_issuers(&self, issuers: &HashSet<String>) -> Result<(), StoreError> {
        let mut sorted: Vec<String> = issuers.iter().cloned().collect();
        sorted.sort();

        let bucket: DbBucket<String> = sorted.into_iter().collect();
        self.save_bucket(TRUSTED_ISSUERS_KEY.to_string(), bucket)
            .await
    }

    async fn list_trusted_issuers(&self) -> Result<HashSet<String>, StoreError> {
        let bucket = self.get_bucket(TRUSTED_ISSUERS_KEY.to_string()).await?;
        Ok(bucket.items().into_iter().collect())
    }

    async fn save_verified_data(&self, id: String, data: &Value) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(data).map_err(|err| StoreError::SerializeError(err.to_string()))?;

        self.save_bytes(self.build_key(VERIFIED_DATA_KEY, id), bytes)
            .await
    }

    async fn get_verified_data(&self, id: String) -> Result<Option<Value>, StoreError> {
        let bytes = self
            .get_bytes(self.build_key(VERIFIED_DATA_KEY, id))
            .await?;

        match bytes {
            Some(value) => {
                let data: Value = serde_json::from_slice(&value)
                    .map_err(|err| StoreError::UnserializeError(err.to_string()))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::json;
    use rst_common::standard::uuid::Uuid;
    use rst_common::with_tokio::tokio;

    use ssi_relay_core::correlation::types::DuplicateDidPolicy;
    use ssi_relay_core::correlation::Store;

    use crate::common::helpers::testdb;

    fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_save_list_identities() {
        let repo = Repository::new(testdb::global_db_builder().to_owned());

        let name = unique("alice");
        let mut identity = IdentityRecord::new(name.clone(), "did:prism:1".to_string());
        identity.rotate("did:prism:2".to_string(), DuplicateDidPolicy::Archive);

        let try_save = repo.save_identity(&identity).await;
        assert!(!try_save.is_err());

        let identities = repo.list_identities().await;
        assert!(!identities.is_err());

        let found = identities
            .unwrap()
            .into_iter()
            .find(|record| record.get_name() == name);
        assert!(found.is_some());

        let found = found.unwrap();
        assert_eq!(found.get_current_did(), "did:prism:2".to_string());
        assert_eq!(found.get_history(), vec!["did:prism:1".to_string()]);
    }

    #[tokio::test]
    async fn test_save_identity_twice_keeps_single_index_entry() {
        let repo = Repository::new(testdb::global_db_builder().to_owned());

        let name = unique("bob");
        let mut identity = IdentityRecord::new(name.clone(), "did:prism:1".to_string());
        let _ = repo.save_identity(&identity).await;

        identity.rotate("did:prism:2".to_string(), DuplicateDidPolicy::Archive);
        let _ = repo.save_identity(&identity).await;

        let matches: Vec<IdentityRecord> = repo
            .list_identities()
            .await
            .unwrap()
            .into_iter()
            .filter(|record| record.get_name() == name)
            .collect();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].get_current_did(), "did:prism:2".to_string());
    }

    #[tokio::test]
    async fn test_trusted_issuers() {
        let repo = Repository::new(testdb::global_db_builder().to_owned());

        let issuers: HashSet<String> = vec![
            "did:prism:issuer-1".to_string(),
            "did:prism:issuer-2".to_string(),
        ]
        .into_iter()
        .collect();

        let try_save = repo.save_trusted_issuers(&issuers).await;
        assert!(!try_save.is_err());

        let loaded = repo.list_trusted_issuers().await;
        assert_eq!(loaded.unwrap(), issuers);
    }

    #[tokio::test]
    async fn test_verified_data() {
        let repo = Repository::new(testdb::global_db_builder().to_owned());

        let id = unique("db");
        let data = json!({"expert_name": "alice", "authorization_level": 2});

        let try_save = repo.save_verified_data(id.clone(), &data).await;
        assert!(!try_save.is_err());

        let loaded = repo.get_verified_data(id).await;
        assert_eq!(loaded.unwrap(), Some(data));

        let missing = repo.get_verified_data(unique("missing")).await;
        assert_eq!(missing.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_survives_restart() {
        let repo = Repository::new(testdb::global_db_builder().to_owned());
        let name = unique("carol");

        let store = Store::init(repo.clone(), DuplicateDidPolicy::Archive)
            .await
            .unwrap();
        let _ = store
            .upsert_identity(name.clone(), "did:prism:a".to_string())
            .await;
        let _ = store
            .upsert_identity(name.clone(), "did:prism:b".to_string())
            .await;
        drop(store);

        let restarted = Store::init(repo, DuplicateDidPolicy::Archive)
            .await
            .unwrap();
        let identity = restarted.get_identity(name).await.unwrap();
        assert_eq!(identity.get_current_did(), "did:prism:b".to_string());
        assert_eq!(identity.get_history(), vec!["did:prism:a".to_string()]);
    }
}
