use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::{json, Value};
use rst_common::with_logging::log::{debug, info};

use crate::agent::types::{AgentAPI, PresentationRequest};
use crate::correlation::types::{RepoBuilder, StoreError};
use crate::exchange::types::{Notifier, Participant, Stage, Topic};
use crate::exchange::ExchangeRecord;

use super::types::{VerifierAPI, WorkflowError};
use super::usecase::Usecase;

const PAYLOAD_STORAGE_ID: &str = "storage_id";

#[async_trait]
impl<TRepo, TNotifier, TAgent> VerifierAPI for Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    async fn request_presentation(
        &self,
        connection_id: String,
        level_required: u32,
        storage_id: String,
        credential_definition_id: Option<String>,
    ) -> Result<ExchangeRecord, WorkflowError> {
        if storage_id.is_empty() {
            return Err(WorkflowError::ValidationError(
                "storage id is required".to_string(),
            ));
        }

        let credential_definition_id = match credential_definition_id {
            Some(id) => id,
            None => self
                .store
                .get_exchange_hint(connection_id.clone())
                .await
                .map(|hint| hint.credential_definition_id)
                .map_err(|err| match err {
                    StoreError::NotFound(_) => WorkflowError::MissingHint(connection_id.clone()),
                    other => WorkflowError::from(other),
                })?,
        };

        let participants = match self.store.get_connection(connection_id.clone()).await {
            Ok(connection) => vec![Participant::Identity(connection.name)],
            Err(_) => Vec::new(),
        };

        let request = PresentationRequest {
            connection_id,
            credential_definition_id,
            level_required,
        };

        let handle = self
            .call(
                "create_presentation_request",
                self.agents.verifier.create_presentation_request(request),
            )
            .await?;

        let _ = self
            .tracker
            .begin_exchange(handle.thid.clone(), participants)
            .await?;
        self.tracker
            .link_alias(handle.thid.clone(), handle.presentation_id.clone())
            .await?;

        let payload = json!({
            "storage_id": storage_id,
            "level_required": level_required,
        });
        let record = self
            .tracker
            .advance(
                handle.thid.clone(),
                Stage::PresentationRequested,
                Some(payload),
            )
            .await?;

        info!(
            "[workflow:request_presentation] {} requested as presentation {}",
            handle.thid, handle.presentation_id
        );

        self.announce(Topic::PresentationRequested, &record).await;
        Ok(record)
    }

    /// `complete_presentation` accepts a verified presentation and keeps its data
    /// under the storage id given when it was requested
    async fn complete_presentation(
        &self,
        presentation_id: String,
    ) -> Result<ExchangeRecord, WorkflowError> {
        let token = self
            .correlator
            .resolve_by_token(presentation_id.clone())
            .await?;

        let current = self.tracker.lookup(token.clone()).await?;
        if current.get_stage() == Stage::Verified {
            debug!(
                "[workflow:complete_presentation] {} already verified",
                token
            );
            return Ok(current);
        }

        // a failed exchange never reaches the agent nor the store
        current.check_transition(Stage::Verified)?;

        let storage_id = current
            .get_payload()
            .get(PAYLOAD_STORAGE_ID)
            .and_then(|value| value.as_str())
            .map(|value| value.to_string())
            .ok_or(WorkflowError::ValidationError(format!(
                "exchange {} has no storage id",
                token
            )))?;

        let agent = &self.agents.verifier;
        self.call(
            "accept_presentation",
            agent.accept_presentation(presentation_id.clone()),
        )
        .await?;

        let data = self
            .call(
                "get_verified_data",
                agent.get_verified_data(presentation_id),
            )
            .await?;

        let verified = match data {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        };

        self.store
            .put_verified_data(storage_id.clone(), verified.clone())
            .await?;

        let record = self
            .tracker
            .advance(token, Stage::Verified, Some(json!({"verified": verified})))
            .await?;

        info!(
            "[workflow:complete_presentation] {} verified, data kept as {}",
            record.get_token(),
            storage_id
        );
        Ok(record)
    }
}
