use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::warn;
use rst_common::with_tokio::tokio;

use crate::agent::types::{AgentAPI, AgentError};
use crate::correlation::types::RepoBuilder;
use crate::correlation::Store;
use crate::correlator::types::{Candidate, CandidateSource, CorrelationError};
use crate::correlator::Correlator;
use crate::exchange::types::{ExchangeError, Notifier, Participant, Topic};
use crate::exchange::{ExchangeRecord, Tracker};

use super::types::{WorkflowError, WorkflowSettings};

/// `Agents` groups the agent instance of each party
pub struct Agents<TAgent>
where
    TAgent: AgentAPI,
{
    pub issuer: TAgent,
    pub holder: TAgent,
    pub verifier: TAgent,
}

impl<TAgent> Agents<TAgent>
where
    TAgent: AgentAPI,
{
    pub fn new(issuer: TAgent, holder: TAgent, verifier: TAgent) -> Self {
        Self {
            issuer,
            holder,
            verifier,
        }
    }
}

/// `Usecase` implements the party workflows on top of the store, the tracker and the correlator
///
/// Every agent call is bounded by [`WorkflowSettings::agent_timeout`] and always happens
/// before any local mutation, a failed call leaves the local state untouched
pub struct Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    pub(super) store: Arc<Store<TRepo>>,
    pub(super) tracker: Arc<Tracker<TNotifier>>,
    pub(super) correlator: Arc<Correlator<TNotifier>>,
    pub(super) agents: Arc<Agents<TAgent>>,
    pub(super) settings: WorkflowSettings,
}

impl<TRepo, TNotifier, TAgent> Clone for Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tracker: self.tracker.clone(),
            correlator: self.correlator.clone(),
            agents: self.agents.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<TRepo, TNotifier, TAgent> Usecase<TRepo, TNotifier, TAgent>
where
    TRepo: RepoBuilder,
    TNotifier: Notifier,
    TAgent: AgentAPI,
{
    pub fn new(
        store: Arc<Store<TRepo>>,
        tracker: Arc<Tracker<TNotifier>>,
        agents: Arc<Agents<TAgent>>,
        settings: WorkflowSettings,
    ) -> Self {
        let correlator = Arc::new(Correlator::new(tracker.clone()));

        Self {
            store,
            tracker,
            correlator,
            agents,
            settings,
        }
    }

    pub fn store(&self) -> Arc<Store<TRepo>> {
        self.store.clone()
    }

    pub fn tracker(&self) -> Arc<Tracker<TNotifier>> {
        self.tracker.clone()
    }

    /// `call` bounds an agent interaction with the configured timeout
    pub(super) async fn call<T, F>(&self, operation: &str, future: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, AgentError>> + Send,
    {
        bounded(self.settings.agent_timeout, operation, future)
            .await
            .map_err(WorkflowError::from)
    }

    /// `ensure_tracked` starts tracking a thread this relay has not seen yet,
    /// used when the other party runs on another relay instance
    pub(super) async fn ensure_tracked(
        &self,
        token: String,
        participants: Vec<Participant>,
    ) -> Result<(), WorkflowError> {
        match self.tracker.lookup(token.clone()).await {
            Ok(_) => Ok(()),
            Err(ExchangeError::UnknownToken(_)) => {
                let _ = self.tracker.begin_exchange(token, participants).await?;
                Ok(())
            }
            Err(err) => Err(WorkflowError::from(err)),
        }
    }

    /// `announce` sends an intermediate notification, a failed delivery is only logged
    /// since the next party can still poll the exchange by its token
    pub(super) async fn announce(&self, topic: Topic, record: &ExchangeRecord) {
        if let Err(err) = self.tracker.announce(topic, record.get_token()).await {
            warn!(
                "[workflow:announce] {:?} for {} not delivered: {}",
                topic,
                record.get_token(),
                err
            );
        }
    }
}

pub(super) async fn bounded<T, F>(
    timeout: Duration,
    operation: &str,
    future: F,
) -> Result<T, AgentError>
where
    F: Future<Output = Result<T, AgentError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "[workflow:{}] agent did not answer within {:?}",
                operation, timeout
            );
            Err(AgentError::UpstreamUnavailable(format!(
                "{}: no answer within {:?}",
                operation, timeout
            )))
        }
    }
}

/// `CredentialRecordSource` lists the agent credential records as correlation candidates
pub(super) struct CredentialRecordSource<'a, TAgent: AgentAPI> {
    pub(super) agent: &'a TAgent,
    pub(super) timeout: Duration,
}

#[async_trait]
impl<'a, TAgent> CandidateSource for CredentialRecordSource<'a, TAgent>
where
    TAgent: AgentAPI,
{
    async fn candidates(&self) -> Result<Vec<Candidate>, CorrelationError> {
        let records = bounded(
            self.timeout,
            "list_credential_records",
            self.agent.list_credential_records(),
        )
        .await
        .map_err(|err| CorrelationError::UpstreamUnavailable(err.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| Candidate::new(record.record_id, record.thid))
            .collect())
    }
}

/// `PresentationSource` lists the agent presentation records as correlation candidates
pub(super) struct PresentationSource<'a, TAgent: AgentAPI> {
    pub(super) agent: &'a TAgent,
    pub(super) timeout: Duration,
}

#[async_trait]
impl<'a, TAgent> CandidateSource for PresentationSource<'a, TAgent>
where
    TAgent: AgentAPI,
{
    async fn candidates(&self) -> Result<Vec<Candidate>, CorrelationError> {
        let records = bounded(
            self.timeout,
            "list_presentations",
            self.agent.list_presentations(),
        )
        .await
        .map_err(|err| CorrelationError::UpstreamUnavailable(err.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| Candidate::new(record.presentation_id, record.thid))
            .collect())
    }
}
