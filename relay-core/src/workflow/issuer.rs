use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;
use rst_common::with_logging::log::info;

use crate::agent::types::{AgentAPI, ConnectionInvitation, CredentialOffer};
use crate::correlation::types::{ConnectionRecord, ExchangeHint, RepoBuilder};
use crate::correlation::IdentityRecord;
use crate::exchange::types::{Notifier, Participant, Stage, Topic};
use crate::exchange::ExchangeRecord;

use super::types::{IssuerAPI, WorkflowError};
use super::usecase::Usecase;

#[async_trait]
impl<TRepo, TNotifier, TAgent> IssuerAPI for Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    async fn register_issuer(&self, name: String) -> Result<IdentityRecord, WorkflowError> {
        if name.is_empty() {
            return Err(WorkflowError::ValidationError(
                "issuer name is required".to_string(),
            ));
        }

        let agent = &self.agents.issuer;
        let long_form_did = self.call("create_did", agent.create_did()).await?;
        let did = self
            .call("publish_did", agent.publish_did(long_form_did))
            .await?;

        let identity = self.store.upsert_identity(name, did.clone()).await?;
        self.store.add_trusted_issuer(did.clone()).await?;

        info!(
            "[workflow:register_issuer] {} registered as {}",
            identity.get_name(),
            did
        );
        Ok(identity)
    }

    async fn open_connection(
        &self,
        label: String,
        name: String,
    ) -> Result<ConnectionInvitation, WorkflowError> {
        let identity = self.store.get_identity(name.clone()).await?;

        let invitation = self
            .call(
                "create_connection",
                self.agents.issuer.create_connection(label),
            )
            .await?;

        self.store
            .put_connection(ConnectionRecord::new(
                invitation.connection_id.clone(),
                name,
                identity.get_current_did(),
            ))
            .await;

        info!(
            "[workflow:open_connection] connection {} opened for {}",
            invitation.connection_id,
            identity.get_name()
        );
        Ok(invitation)
    }

    async fn offer_credential(
        &self,
        issuer_name: String,
        connection_id: String,
        credential_definition_id: String,
        claims: Value,
    ) -> Result<ExchangeRecord, WorkflowError> {
        if credential_definition_id.is_empty() {
            return Err(WorkflowError::ValidationError(
                "credential definition id is required".to_string(),
            ));
        }

        let issuer = self.store.get_identity(issuer_name).await?;
        let connection = self.store.get_connection(connection_id.clone()).await?;

        let offer = CredentialOffer {
            connection_id: connection_id.clone(),
            issuer_did: issuer.get_current_did(),
            credential_definition_id: credential_definition_id.clone(),
            claims,
            validity_period: self.settings.validity_period,
        };

        let thid = self
            .call(
                "create_credential_offer",
                self.agents.issuer.create_credential_offer(offer),
            )
            .await?;

        let participants = vec![
            Participant::Issuer(issuer.get_current_did()),
            Participant::Identity(connection.name),
        ];

        let _ = self
            .tracker
            .begin_exchange(thid.clone(), participants)
            .await?;
        let record = self.tracker.advance(thid, Stage::OfferSent, None).await?;

        self.store
            .put_exchange_hint(
                connection_id.clone(),
                ExchangeHint::new(credential_definition_id, connection_id),
            )
            .await;

        self.announce(Topic::OfferReady, &record).await;
        Ok(record)
    }
}
