use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::info;

use crate::agent::types::AgentAPI;
use crate::correlation::types::RepoBuilder;
use crate::correlation::IdentityRecord;
use crate::exchange::types::{Notifier, Participant, Stage};
use crate::exchange::ExchangeRecord;

use super::types::{HolderAPI, WorkflowError};
use super::usecase::{CredentialRecordSource, PresentationSource, Usecase};

#[async_trait]
impl<TRepo, TNotifier, TAgent> HolderAPI for Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    /// `rotate_identity` creates a new `DID` at the holder agent and archives the previous one
    async fn rotate_identity(&self, name: String) -> Result<IdentityRecord, WorkflowError> {
        if name.is_empty() {
            return Err(WorkflowError::ValidationError(
                "identity name is required".to_string(),
            ));
        }

        let agent = &self.agents.holder;
        let long_form_did = self.call("create_did", agent.create_did()).await?;
        let did = self
            .call("publish_did", agent.publish_did(long_form_did))
            .await?;

        let identity = self.store.upsert_identity(name, did).await?;
        info!(
            "[workflow:rotate_identity] {} now uses {}",
            identity.get_name(),
            identity.get_current_did()
        );
        Ok(identity)
    }

    async fn accept_invitation(&self, raw_invitation: String) -> Result<String, WorkflowError> {
        if raw_invitation.is_empty() {
            return Err(WorkflowError::ValidationError(
                "raw invitation is required".to_string(),
            ));
        }

        let connection_id = self
            .call(
                "accept_connection_invitation",
                self.agents.holder.accept_connection_invitation(raw_invitation),
            )
            .await?;

        Ok(connection_id)
    }

    async fn accept_offer(
        &self,
        thid: String,
        holder_name: String,
    ) -> Result<ExchangeRecord, WorkflowError> {
        let holder = self.store.get_identity(holder_name.clone()).await?;

        let source = CredentialRecordSource {
            agent: &self.agents.holder,
            timeout: self.settings.agent_timeout,
        };

        let record_id = self
            .correlator
            .resolve_with_retry(&source, thid.clone(), &self.settings.retry)
            .await?;

        self.call(
            "accept_credential_offer",
            self.agents
                .holder
                .accept_credential_offer(record_id.clone(), holder.get_current_did()),
        )
        .await?;

        self.ensure_tracked(thid.clone(), vec![Participant::Identity(holder_name)])
            .await?;
        let record = self
            .tracker
            .advance(thid.clone(), Stage::OfferAccepted, None)
            .await?;

        info!(
            "[workflow:accept_offer] {} accepted through record {}",
            thid, record_id
        );
        Ok(record)
    }

    async fn accept_presentation_request(
        &self,
        presentation_thid: String,
        credential_thid: String,
    ) -> Result<ExchangeRecord, WorkflowError> {
        let presentations = PresentationSource {
            agent: &self.agents.holder,
            timeout: self.settings.agent_timeout,
        };

        let presentation_id = self
            .correlator
            .resolve_with_retry(
                &presentations,
                presentation_thid.clone(),
                &self.settings.retry,
            )
            .await?;

        let credentials = CredentialRecordSource {
            agent: &self.agents.holder,
            timeout: self.settings.agent_timeout,
        };

        let credential_record_id = self
            .correlator
            .resolve_with_retry(&credentials, credential_thid, &self.settings.retry)
            .await?;

        self.call(
            "accept_presentation_request",
            self.agents
                .holder
                .accept_presentation_request(presentation_id.clone(), credential_record_id),
        )
        .await?;

        self.ensure_tracked(presentation_thid.clone(), Vec::new())
            .await?;
        let record = self
            .tracker
            .advance(presentation_thid, Stage::PresentationAccepted, None)
            .await?;

        info!(
            "[workflow:accept_presentation_request] presentation {} submitted",
            presentation_id
        );
        Ok(record)
    }
}
