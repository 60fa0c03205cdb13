use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info, warn};

use crate::agent::event::{AgentEvent, EventAction};
use crate::agent::types::AgentAPI;
use crate::correlation::types::RepoBuilder;
use crate::correlator::types::{CorrelationError, Signal};
use crate::exchange::types::Notifier;
use crate::exchange::ExchangeRecord;

use super::types::{VerifierAPI, WebhookAPI, WorkflowError};
use super::usecase::Usecase;

#[async_trait]
impl<TRepo, TNotifier, TAgent> WebhookAPI for Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    async fn handle_event(
        &self,
        event: AgentEvent,
    ) -> Result<Option<ExchangeRecord>, WorkflowError> {
        match event.to_action()? {
            EventAction::ConnectionAcknowledged(connection_id) => {
                match self.store.get_connection(connection_id.clone()).await {
                    Ok(connection) => info!(
                        "[webhook:handle_event] connection accepted by {}, did: {}",
                        connection.name, connection.subject_did
                    ),
                    Err(_) => warn!(
                        "[webhook:handle_event] connection {} is not registered",
                        connection_id
                    ),
                }

                Ok(None)
            }
            EventAction::Advance(signal) => self.apply_signal(signal).await,
            EventAction::CompletePresentation(presentation_id) => {
                let record = self.complete_presentation(presentation_id).await?;
                Ok(Some(record))
            }
            EventAction::Ignore => {
                debug!("[webhook:handle_event] ignored {}", event.kind);
                Ok(None)
            }
        }
    }

    /// `apply_signal` advances the exchange a signal points to, signals about exchanges
    /// this relay does not track are dropped
    async fn apply_signal(&self, signal: Signal) -> Result<Option<ExchangeRecord>, WorkflowError> {
        let stage = match signal.stage {
            Some(stage) => stage,
            None => return Ok(None),
        };

        let token = match self.correlator.resolve(&signal).await {
            Ok(token) => token,
            Err(CorrelationError::NotFound(reason)) => {
                debug!("[webhook:apply_signal] untracked signal, {}", reason);
                return Ok(None);
            }
            Err(err) => return Err(WorkflowError::from(err)),
        };

        let record = self.tracker.advance(token, stage, signal.payload).await?;
        Ok(Some(record))
    }
}
