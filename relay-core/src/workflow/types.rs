use std::time::Duration;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use crate::agent::event::AgentEvent;
use crate::agent::types::{AgentError, ConnectionInvitation};
use crate::correlation::types::StoreError;
use crate::correlation::IdentityRecord;
use crate::correlator::types::{CorrelationError, RetryPolicy, Signal};
use crate::exchange::types::ExchangeError;
use crate::exchange::ExchangeRecord;

/// `WorkflowError` wraps every error a party operation may hit
#[derive(Debug, PartialEq, Error, Clone)]
pub enum WorkflowError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("missing exchange hint: {0}")]
    MissingHint(String),
}

impl WorkflowError {
    /// `is_retryable` is true when nothing changed locally and the same call may succeed later
    ///
    /// A correlation miss counts: an agent event may arrive before the exchange it
    /// belongs to has been tracked
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkflowError::Agent(AgentError::UpstreamUnavailable(_))
                | WorkflowError::Agent(AgentError::Timeout(_))
                | WorkflowError::Correlation(CorrelationError::UpstreamUnavailable(_))
                | WorkflowError::Correlation(CorrelationError::NotFound(_))
        )
    }
}

/// `WorkflowSettings` carries the caller supplied bounds of every agent interaction
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub agent_timeout: Duration,
    pub retry: RetryPolicy,
    pub validity_period: f64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            validity_period: 3600.0,
        }
    }
}

#[async_trait]
pub trait IssuerAPI: Clone + Send + Sync {
    async fn register_issuer(&self, name: String) -> Result<IdentityRecord, WorkflowError>;

    async fn open_connection(
        &self,
        label: String,
        name: String,
    ) -> Result<ConnectionInvitation, WorkflowError>;

    async fn offer_credential(
        &self,
        issuer_name: String,
        connection_id: String,
        credential_definition_id: String,
        claims: Value,
    ) -> Result<ExchangeRecord, WorkflowError>;
}

#[async_trait]
pub trait HolderAPI: Clone + Send + Sync {
    async fn rotate_identity(&self, name: String) -> Result<IdentityRecord, WorkflowError>;
    async fn accept_invitation(&self, raw_invitation: String) -> Result<String, WorkflowError>;

    async fn accept_offer(
        &self,
        thid: String,
        holder_name: String,
    ) -> Result<ExchangeRecord, WorkflowError>;

    async fn accept_presentation_request(
        &self,
        presentation_thid: String,
        credential_thid: String,
    ) -> Result<ExchangeRecord, WorkflowError>;
}

#[async_trait]
pub trait VerifierAPI: Clone + Send + Sync {
    async fn request_presentation(
        &self,
        connection_id: String,
        level_required: u32,
        storage_id: String,
        credential_definition_id: Option<String>,
    ) -> Result<ExchangeRecord, WorkflowError>;

    async fn complete_presentation(
        &self,
        presentation_id: String,
    ) -> Result<ExchangeRecord, WorkflowError>;
}

#[async_trait]
pub trait WebhookAPI: Clone + Send + Sync {
    async fn handle_event(&self, event: AgentEvent)
        -> Result<Option<ExchangeRecord>, WorkflowError>;

    async fn apply_signal(&self, signal: Signal) -> Result<Option<ExchangeRecord>, WorkflowError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_test::table_test;

    #[test]
    fn test_is_retryable() {
        let table = vec![
            (
                WorkflowError::Agent(AgentError::Timeout("list".to_string())),
                true,
            ),
            (
                WorkflowError::Correlation(CorrelationError::UpstreamUnavailable(
                    "refused".to_string(),
                )),
                true,
            ),
            (
                WorkflowError::Correlation(CorrelationError::NotFound("pres-9".to_string())),
                true,
            ),
            (
                WorkflowError::Correlation(CorrelationError::AmbiguousMatch("thid-1".to_string())),
                false,
            ),
            (WorkflowError::ValidationError("empty".to_string()), false),
            (WorkflowError::MissingHint("pres-1".to_string()), false),
        ];

        for (validator, input, expected) in table_test!(table) {
            validator
                .given(&format!("{:?}", input))
                .when("is_retryable")
                .then("matches the expected verdict")
                .assert_eq(expected, input.is_retryable());
        }
    }
}
