use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

/// `AgentError` provides all specific error types relate with the external identity agent
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum AgentError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// `ConnectionInvitation` is the result of opening a connection on the inviter side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionInvitation {
    pub raw_invitation: String,
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialOffer {
    pub connection_id: String,
    pub issuer_did: String,
    pub credential_definition_id: String,
    pub claims: Value,
    pub validity_period: f64,
}

/// `PresentationRequest` asks the holder to prove its authorization level against
/// the given credential definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PresentationRequest {
    pub connection_id: String,
    pub credential_definition_id: String,
    pub level_required: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PresentationHandle {
    pub thid: String,
    pub presentation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub record_id: String,
    pub thid: String,

    #[serde(default)]
    pub protocol_state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    pub presentation_id: String,
    pub thid: String,

    #[serde(default)]
    pub status: String,
}

/// `AgentAPI` is everything the relay needs from the external identity agent
///
/// One implementation per party, each pointing to its own agent instance
#[async_trait]
pub trait AgentAPI: Send + Sync {
    async fn create_did(&self) -> Result<String, AgentError>;
    async fn publish_did(&self, long_form_did: String) -> Result<String, AgentError>;

    async fn create_connection(&self, label: String) -> Result<ConnectionInvitation, AgentError>;
    async fn accept_connection_invitation(&self, raw_invitation: String)
        -> Result<String, AgentError>;

    async fn create_credential_offer(&self, offer: CredentialOffer) -> Result<String, AgentError>;
    async fn list_credential_records(&self) -> Result<Vec<CredentialRecord>, AgentError>;
    async fn accept_credential_offer(
        &self,
        record_id: String,
        subject_did: String,
    ) -> Result<(), AgentError>;

    async fn create_presentation_request(
        &self,
        request: PresentationRequest,
    ) -> Result<PresentationHandle, AgentError>;
    async fn list_presentations(&self) -> Result<Vec<PresentationRecord>, AgentError>;
    async fn accept_presentation_request(
        &self,
        presentation_id: String,
        credential_record_id: String,
    ) -> Result<(), AgentError>;
    async fn accept_presentation(&self, presentation_id: String) -> Result<(), AgentError>;
    async fn get_verified_data(&self, presentation_id: String) -> Result<Value, AgentError>;
}
