use std::collections::{HashMap, HashSet};

use rst_common::standard::serde_json::Value;
use rst_common::with_logging::log::{debug, info, warn};
use rst_common::with_tokio::tokio::sync::RwLock;

use super::types::{ConnectionRecord, DuplicateDidPolicy, ExchangeHint, RepoBuilder, StoreError};
use super::IdentityRecord;

/// `Store` is the shared correlation store
///
/// Each logical map has its own lock. Writes that must survive a restart are handed to the
/// repository while the lock is held, the in-memory map only changes after the repository
/// accepted the write.
pub struct Store<TRepo>
where
    TRepo: RepoBuilder,
{
    repo: TRepo,
    policy: DuplicateDidPolicy,
    identities: RwLock<HashMap<String, IdentityRecord>>,
    issuers: RwLock<HashSet<String>>,
    hints: RwLock<HashMap<String, ExchangeHint>>,
    verified_data: RwLock<HashMap<String, Value>>,
    connections: RwLock<HashMap<String, ConnectionRecord>>,
}

impl<TRepo> Store<TRepo>
where
    TRepo: RepoBuilder,
{
    /// `init` builds the store and loads everything the repository already persisted
    pub async fn init(repo: TRepo, policy: DuplicateDidPolicy) -> Result<Self, StoreError> {
        let identities = repo
            .list_identities()
            .await?
            .into_iter()
            .map(|identity| (identity.get_name(), identity))
            .collect::<HashMap<String, IdentityRecord>>();

        let issuers = repo.list_trusted_issuers().await?;

        info!(
            "[store:init] loaded identities: {}, trusted issuers: {}",
            identities.len(),
            issuers.len()
        );

        Ok(Self {
            repo,
            policy,
            identities: RwLock::new(identities),
            issuers: RwLock::new(issuers),
            hints: RwLock::new(HashMap::new()),
            verified_data: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
        })
    }

    /// `teardown` flushes a full snapshot of the durable maps
    pub async fn teardown(&self) -> Result<(), StoreError> {
        let identities = self.identities.read().await;
        for identity in identities.values() {
            self.repo.save_identity(identity).await?;
        }

        let issuers = self.issuers.read().await;
        self.repo.save_trusted_issuers(&issuers).await?;

        info!(
            "[store:teardown] flushed identities: {}, trusted issuers: {}",
            identities.len(),
            issuers.len()
        );
        Ok(())
    }

    pub fn policy(&self) -> DuplicateDidPolicy {
        self.policy
    }

    pub async fn upsert_identity(
        &self,
        name: String,
        did: String,
    ) -> Result<IdentityRecord, StoreError> {
        let mut identities = self.identities.write().await;
        self.upsert_locked(&mut identities, name, did).await
    }

    /// `compare_and_upsert_identity` only replaces the DID when the caller saw the latest state
    ///
    /// `expected_current` set to `None` means the identity must not exist yet
    pub async fn compare_and_upsert_identity(
        &self,
        name: String,
        expected_current: Option<String>,
        did: String,
    ) -> Result<IdentityRecord, StoreError> {
        let mut identities = self.identities.write().await;

        let actual = identities
            .get(&name)
            .map(|identity| identity.get_current_did());

        if actual != expected_current {
            warn!(
                "[store:compare_and_upsert_identity] conflict on {}: expected {:?}, got {:?}",
                name, expected_current, actual
            );
            return Err(StoreError::Conflict(format!(
                "identity {} changed, current did is {:?}",
                name, actual
            )));
        }

        self.upsert_locked(&mut identities, name, did).await
    }

    async fn upsert_locked(
        &self,
        identities: &mut HashMap<String, IdentityRecord>,
        name: String,
        did: String,
    ) -> Result<IdentityRecord, StoreError> {
        let identity = match identities.get(&name) {
            Some(existing) => {
                let mut updated = existing.clone();
                if !updated.rotate(did, self.policy) {
                    debug!("[store:upsert_identity] unchanged did for {}", name);
                    return Ok(updated);
                }
                updated
            }
            None => IdentityRecord::new(name.clone(), did),
        };

        self.repo.save_identity(&identity).await?;
        identities.insert(name.clone(), identity.clone());

        debug!(
            "[store:upsert_identity] {} -> {} (history: {})",
            name,
            identity.get_current_did(),
            identity.history.len()
        );
        Ok(identity)
    }

    pub async fn get_identity(&self, name: String) -> Result<IdentityRecord, StoreError> {
        let identities = self.identities.read().await;
        identities
            .get(&name)
            .cloned()
            .ok_or(StoreError::NotFound(format!("identity: {}", name)))
    }

    pub async fn list_identities(&self) -> Vec<IdentityRecord> {
        let identities = self.identities.read().await;
        identities.values().cloned().collect()
    }

    pub async fn add_trusted_issuer(&self, id: String) -> Result<(), StoreError> {
        let mut issuers = self.issuers.write().await;
        if issuers.contains(&id) {
            return Ok(());
        }

        let mut updated = issuers.clone();
        updated.insert(id.clone());
        self.repo.save_trusted_issuers(&updated).await?;

        *issuers = updated;
        info!("[store:add_trusted_issuer] {}", id);
        Ok(())
    }

    pub async fn remove_trusted_issuer(&self, id: String) -> Result<(), StoreError> {
        let mut issuers = self.issuers.write().await;
        if !issuers.contains(&id) {
            return Err(StoreError::NotFound(format!("trusted issuer: {}", id)));
        }

        let mut updated = issuers.clone();
        updated.remove(&id);
        self.repo.save_trusted_issuers(&updated).await?;

        *issuers = updated;
        info!("[store:remove_trusted_issuer] {}", id);
        Ok(())
    }

    pub async fn is_trusted_issuer(&self, id: String) -> bool {
        self.issuers.read().await.contains(&id)
    }

    pub async fn trusted_issuers(&self) -> HashSet<String> {
        self.issuers.read().await.clone()
    }

    pub async fn put_exchange_hint(&self, key: String, hint: ExchangeHint) {
        let mut hints = self.hints.write().await;
        hints.insert(key, hint);
    }

    pub async fn get_exchange_hint(&self, key: String) -> Result<ExchangeHint, StoreError> {
        let hints = self.hints.read().await;
        hints
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(format!("exchange hint: {}", key)))
    }

    pub async fn put_verified_data(&self, id: String, data: Value) -> Result<(), StoreError> {
        let mut verified_data = self.verified_data.write().await;
        self.repo.save_verified_data(id.clone(), &data).await?;
        verified_data.insert(id, data);
        Ok(())
    }

    /// `get_verified_data` falls back to the repository for entries written by a previous run
    pub async fn get_verified_data(&self, id: String) -> Result<Value, StoreError> {
        {
            let verified_data = self.verified_data.read().await;
            if let Some(data) = verified_data.get(&id) {
                return Ok(data.clone());
            }
        }

        self.repo
            .get_verified_data(id.clone())
            .await?
            .ok_or(StoreError::NotFound(format!("verified data: {}", id)))
    }

    pub async fn put_connection(&self, connection: ConnectionRecord) {
        let mut connections = self.connections.write().await;
        connections.insert(connection.connection_id.clone(), connection);
    }

    pub async fn get_connection(
        &self,
        connection_id: String,
    ) -> Result<ConnectionRecord, StoreError> {
        let connections = self.connections.read().await;
        connections
            .get(&connection_id)
            .cloned()
            .ok_or(StoreError::NotFound(format!("connection: {}", connection_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use mockall::mock;
    use mockall::predicate::eq;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::serde_json;
    use rst_common::with_tokio::tokio;

    mock!(
        FakeRepo{}

        #[async_trait]
        impl RepoBuilder for FakeRepo {
            async fn save_identity(&self, identity: &IdentityRecord) -> Result<(), StoreError>;
            async fn list_identities(&self) -> Result<Vec<IdentityRecord>, StoreError>;
            async fn save_trusted_issuers(&self, issuers: &HashSet<String>) -> Result<(), StoreError>;
            async fn list_trusted_issuers(&self) -> Result<HashSet<String>, StoreError>;
            async fn save_verified_data(&self, id: String, data: &Value) -> Result<(), StoreError>;
            async fn get_verified_data(&self, id: String) -> Result<Option<Value>, StoreError>;
        }
    );

    fn empty_repo() -> MockFakeRepo {
        let mut repo = MockFakeRepo::new();
        repo.expect_list_identities()
            .times(1)
            .returning(|| Ok(Vec::new()));
        repo.expect_list_trusted_issuers()
            .times(1)
            .returning(|| Ok(HashSet::new()));
        repo
    }

    #[tokio::test]
    async fn test_init_loads_persisted_state() {
        let mut repo = MockFakeRepo::new();
        repo.expect_list_identities().times(1).returning(|| {
            Ok(vec![IdentityRecord::new(
                "alice".to_string(),
                "did:1".to_string(),
            )])
        });
        repo.expect_list_trusted_issuers().times(1).returning(|| {
            let mut issuers = HashSet::new();
            issuers.insert("did:issuer".to_string());
            Ok(issuers)
        });

        let store = Store::init(repo, DuplicateDidPolicy::default()).await;
        assert!(!store.is_err());

        let store = store.unwrap();
        let identity = store.get_identity("alice".to_string()).await;
        assert!(!identity.is_err());
        assert_eq!(identity.unwrap().get_current_did(), "did:1".to_string());
        assert!(store.is_trusted_issuer("did:issuer".to_string()).await);
    }

    #[tokio::test]
    async fn test_upsert_identity_history_sequence() {
        let mut repo = empty_repo();
        repo.expect_save_identity().times(3).returning(|_| Ok(()));

        let store = Store::init(repo, DuplicateDidPolicy::Archive)
            .await
            .unwrap();

        for did in ["d1", "d2", "d3"] {
            let result = store
                .upsert_identity("alice".to_string(), did.to_string())
                .await;
            assert!(!result.is_err());
        }

        let identity = store.get_identity("alice".to_string()).await.unwrap();
        assert_eq!(identity.get_current_did(), "d3".to_string());
        assert_eq!(
            identity.get_history(),
            vec!["d1".to_string(), "d2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upsert_duplicate_did_archive_policy() {
        let mut repo = empty_repo();
        repo.expect_save_identity().times(2).returning(|_| Ok(()));

        let store = Store::init(repo, DuplicateDidPolicy::Archive)
            .await
            .unwrap();

        let _ = store
            .upsert_identity("alice".to_string(), "d1".to_string())
            .await;
        let identity = store
            .upsert_identity("alice".to_string(), "d1".to_string())
            .await
            .unwrap();

        assert_eq!(identity.get_current_did(), "d1".to_string());
        assert_eq!(identity.get_history(), vec!["d1".to_string()]);
    }

    #[tokio::test]
    async fn test_upsert_duplicate_did_skip_policy() {
        let mut repo = empty_repo();
        repo.expect_save_identity().times(1).returning(|_| Ok(()));

        let store = Store::init(repo, DuplicateDidPolicy::Skip).await.unwrap();

        let _ = store
            .upsert_identity("alice".to_string(), "d1".to_string())
            .await;
        let identity = store
            .upsert_identity("alice".to_string(), "d1".to_string())
            .await
            .unwrap();

        assert_eq!(identity.get_current_did(), "d1".to_string());
        assert!(identity.get_history().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_storage_failure_keeps_state() {
        let mut repo = empty_repo();
        let mut counter = 0;
        repo.expect_save_identity().times(2).returning(move |_| {
            counter += 1;
            if counter == 1 {
                return Ok(());
            }

            Err(StoreError::StorageError("disk full".to_string()))
        });

        let store = Store::init(repo, DuplicateDidPolicy::Archive)
            .await
            .unwrap();

        let _ = store
            .upsert_identity("alice".to_string(), "d1".to_string())
            .await;
        let failed = store
            .upsert_identity("alice".to_string(), "d2".to_string())
            .await;
        assert!(failed.is_err());
        assert!(matches!(failed.unwrap_err(), StoreError::StorageError(_)));

        let identity = store.get_identity("alice".to_string()).await.unwrap();
        assert_eq!(identity.get_current_did(), "d1".to_string());
        assert!(identity.get_history().is_empty());
    }

    #[tokio::test]
    async fn test_compare_and_upsert_identity() {
        let mut repo = empty_repo();
        repo.expect_save_identity().times(2).returning(|_| Ok(()));

        let store = Store::init(repo, DuplicateDidPolicy::Archive)
            .await
            .unwrap();

        let created = store
            .compare_and_upsert_identity("alice".to_string(), None, "d1".to_string())
            .await;
        assert!(!created.is_err());

        let conflict = store
            .compare_and_upsert_identity("alice".to_string(), None, "d2".to_string())
            .await;
        assert!(matches!(conflict.unwrap_err(), StoreError::Conflict(_)));

        let stale = store
            .compare_and_upsert_identity(
                "alice".to_string(),
                Some("d0".to_string()),
                "d2".to_string(),
            )
            .await;
        assert!(matches!(stale.unwrap_err(), StoreError::Conflict(_)));

        let updated = store
            .compare_and_upsert_identity(
                "alice".to_string(),
                Some("d1".to_string()),
                "d2".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(updated.get_current_did(), "d2".to_string());
        assert_eq!(updated.get_history(), vec!["d1".to_string()]);
    }

    #[tokio::test]
    async fn test_get_identity_not_found() {
        let store = Store::init(empty_repo(), DuplicateDidPolicy::default())
            .await
            .unwrap();

        let result = store.get_identity("unknown".to_string()).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), StoreError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_keep_every_did() {
        let total = 32;

        let mut repo = empty_repo();
        repo.expect_save_identity()
            .times(total)
            .returning(|_| Ok(()));

        let store = Arc::new(
            Store::init(repo, DuplicateDidPolicy::Archive)
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for idx in 0..total {
            let store_cloned = store.clone();
            handles.push(tokio::spawn(async move {
                store_cloned
                    .upsert_identity("alice".to_string(), format!("did:{}", idx))
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(!result.is_err());
        }

        let submitted: HashSet<String> = (0..total).map(|idx| format!("did:{}", idx)).collect();

        let identity = store.get_identity("alice".to_string()).await.unwrap();
        assert_eq!(identity.get_history().len(), total - 1);
        assert!(submitted.contains(&identity.get_current_did()));

        let mut seen: HashSet<String> = identity.get_history().into_iter().collect();
        seen.insert(identity.get_current_did());
        assert_eq!(seen, submitted);
    }

    #[tokio::test]
    async fn test_trusted_issuers() {
        let mut repo = empty_repo();
        repo.expect_save_trusted_issuers()
            .times(2)
            .returning(|_| Ok(()));

        let store = Store::init(repo, DuplicateDidPolicy::default())
            .await
            .unwrap();

        assert!(!store
            .add_trusted_issuer("did:issuer".to_string())
            .await
            .is_err());
        assert!(!store
            .add_trusted_issuer("did:issuer".to_string())
            .await
            .is_err());

        let issuers = store.trusted_issuers().await;
        assert_eq!(issuers.len(), 1);
        assert!(store.is_trusted_issuer("did:issuer".to_string()).await);

        assert!(!store
            .remove_trusted_issuer("did:issuer".to_string())
            .await
            .is_err());
        assert!(!store.is_trusted_issuer("did:issuer".to_string()).await);

        let missing = store.remove_trusted_issuer("did:other".to_string()).await;
        assert!(matches!(missing.unwrap_err(), StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_exchange_hints_per_connection() {
        let store = Store::init(empty_repo(), DuplicateDidPolicy::default())
            .await
            .unwrap();

        store
            .put_exchange_hint(
                "conn-1".to_string(),
                ExchangeHint::new("cred-def-1".to_string(), "conn-1".to_string()),
            )
            .await;
        store
            .put_exchange_hint(
                "conn-2".to_string(),
                ExchangeHint::new("cred-def-2".to_string(), "conn-2".to_string()),
            )
            .await;

        let hint = store.get_exchange_hint("conn-1".to_string()).await.unwrap();
        assert_eq!(hint.credential_definition_id, "cred-def-1".to_string());

        let missing = store.get_exchange_hint("conn-3".to_string()).await;
        assert!(matches!(missing.unwrap_err(), StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_verified_data_falls_back_to_repo() {
        let mut repo = empty_repo();
        repo.expect_save_verified_data()
            .times(1)
            .returning(|_, _| Ok(()));
        repo.expect_get_verified_data()
            .with(eq("old".to_string()))
            .times(1)
            .returning(|_| Ok(Some(serde_json::json!({"name": "bob"}))));
        repo.expect_get_verified_data()
            .with(eq("missing".to_string()))
            .times(1)
            .returning(|_| Ok(None));

        let store = Store::init(repo, DuplicateDidPolicy::default())
            .await
            .unwrap();

        let _ = store
            .put_verified_data("new".to_string(), serde_json::json!({"level": 2}))
            .await;

        let fresh = store.get_verified_data("new".to_string()).await.unwrap();
        assert_eq!(fresh, serde_json::json!({"level": 2}));

        let old = store.get_verified_data("old".to_string()).await.unwrap();
        assert_eq!(old, serde_json::json!({"name": "bob"}));

        let missing = store.get_verified_data("missing".to_string()).await;
        assert!(matches!(missing.unwrap_err(), StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_connections() {
        let store = Store::init(empty_repo(), DuplicateDidPolicy::default())
            .await
            .unwrap();

        store
            .put_connection(ConnectionRecord::new(
                "conn-1".to_string(),
                "alice".to_string(),
                "did:1".to_string(),
            ))
            .await;

        let connection = store.get_connection("conn-1".to_string()).await.unwrap();
        assert_eq!(connection.name, "alice".to_string());

        let missing = store.get_connection("conn-2".to_string()).await;
        assert!(matches!(missing.unwrap_err(), StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_teardown_flushes_snapshot() {
        let mut repo = empty_repo();
        repo.expect_save_identity().times(2).returning(|_| Ok(()));
        repo.expect_save_trusted_issuers()
            .times(2)
            .returning(|_| Ok(()));

        let store = Store::init(repo, DuplicateDidPolicy::default())
            .await
            .unwrap();

        let _ = store
            .upsert_identity("alice".to_string(), "d1".to_string())
            .await;
        let _ = store.add_trusted_issuer("did:issuer".to_string()).await;

        assert!(!store.teardown().await.is_err());
    }
}
