use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockall::mock;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;
use rst_common::with_tokio::tokio;

use crate::agent::types::{
    AgentAPI, AgentError, ConnectionInvitation, CredentialOffer, CredentialRecord,
    PresentationHandle, PresentationRecord, PresentationRequest,
};
use crate::correlation::types::{DuplicateDidPolicy, RepoBuilder, StoreError};
use crate::correlation::{IdentityRecord, Store};
use crate::correlator::types::RetryPolicy;
use crate::exchange::types::{ExchangeError, Notification, Notifier};
use crate::exchange::Tracker;

use super::types::WorkflowSettings;
use super::usecase::{Agents, Usecase};

mock!(
    pub FakeRepo{}

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

mock!(
    pub FakeNotifier{}

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn notify(&self, notification: Notification) -> Result<(), ExchangeError>;
    }
);

mock!(
    pub FakeAgent{}

    #[async_trait]
    impl AgentAPI for FakeAgent {
        async fn create_did(&self) -> Result<String, AgentError>;
        async fn publish_did(&self, long_form_did: String) -> Result<String, AgentError>;
        async fn create_connection(&self, label: String) -> Result<ConnectionInvitation, AgentError>;
        async fn accept_connection_invitation(&self, raw_invitation: String) -> Result<String, AgentError>;
        async fn create_credential_offer(&self, offer: CredentialOffer) -> Result<String, AgentError>;
        async fn list_credential_records(&self) -> Result<Vec<CredentialRecord>, AgentError>;
        async fn accept_credential_offer(&self, record_id: String, subject_did: String) -> Result<(), AgentError>;
        async fn create_presentation_request(&self, request: PresentationRequest) -> Result<PresentationHandle, AgentError>;
        async fn list_presentations(&self) -> Result<Vec<PresentationRecord>, AgentError>;
        async fn accept_presentation_request(&self, presentation_id: String, credential_record_id: String) -> Result<(), AgentError>;
        async fn accept_presentation(&self, presentation_id: String) -> Result<(), AgentError>;
        async fn get_verified_data(&self, presentation_id: String) -> Result<Value, AgentError>;
    }
);

pub type Sent = Arc<Mutex<Vec<Notification>>>;

pub fn permissive_repo() -> MockFakeRepo {
    let mut repo = MockFakeRepo::new();
    repo.expect_list_identities().returning(|| Ok(Vec::new()));
    repo.expect_list_trusted_issuers()
        .returning(|| Ok(HashSet::new()));
    repo.expect_save_identity().returning(|_| Ok(()));
    repo.expect_save_trusted_issuers().returning(|_| Ok(()));
    repo.expect_save_verified_data().returning(|_, _| Ok(()));
    repo.expect_get_verified_data().returning(|_| Ok(None));
    repo
}

pub fn recording_notifier() -> (MockFakeNotifier, Sent) {
    let sent: Sent = Arc::new(Mutex::new(Vec::new()));
    let sent_cloned = sent.clone();

    let mut notifier = MockFakeNotifier::new();
    notifier.expect_notify().returning(move |notification| {
        sent_cloned.lock().unwrap().push(notification);
        Ok(())
    });

    (notifier, sent)
}

pub fn test_settings() -> WorkflowSettings {
    WorkflowSettings {
        agent_timeout: Duration::from_millis(200),
        retry: RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(4)),
        validity_period: 3600.0,
    }
}

pub async fn generate_usecase<TAgent: AgentAPI>(
    issuer: TAgent,
    holder: TAgent,
    verifier: TAgent,
    notifier: MockFakeNotifier,
) -> Usecase<MockFakeRepo, MockFakeNotifier, TAgent> {
    let store = Store::init(permissive_repo(), DuplicateDidPolicy::Archive)
        .await
        .unwrap();

    Usecase::new(
        Arc::new(store),
        Arc::new(Tracker::new(notifier)),
        Arc::new(Agents::new(issuer, holder, verifier)),
        test_settings(),
    )
}

/// `SlowAgent` never answers within the test timeout
pub struct SlowAgent;

#[async_trait]
impl AgentAPI for SlowAgent {
    async fn create_did(&self) -> Result<String, AgentError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("did:prism:late".to_string())
    }

    async fn publish_did(&self, _long_form_did: String) -> Result<String, AgentError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("did:prism:late".to_string())
    }

    async fn create_connection(&self, _label: String) -> Result<ConnectionInvitation, AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn accept_connection_invitation(
        &self,
        _raw_invitation: String,
    ) -> Result<String, AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn create_credential_offer(&self, _offer: CredentialOffer) -> Result<String, AgentError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("thid-late".to_string())
    }

    async fn list_credential_records(&self) -> Result<Vec<CredentialRecord>, AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn accept_credential_offer(
        &self,
        _record_id: String,
        _subject_did: String,
    ) -> Result<(), AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn create_presentation_request(
        &self,
        _request: PresentationRequest,
    ) -> Result<PresentationHandle, AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn list_presentations(&self) -> Result<Vec<PresentationRecord>, AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn accept_presentation_request(
        &self,
        _presentation_id: String,
        _credential_record_id: String,
    ) -> Result<(), AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn accept_presentation(&self, _presentation_id: String) -> Result<(), AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }

    async fn get_verified_data(&self, _presentation_id: String) -> Result<Value, AgentError> {
        Err(AgentError::UpstreamUnavailable("unused".to_string()))
    }
}
