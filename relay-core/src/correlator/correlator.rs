use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, warn};
use rst_common::with_tokio::tokio;

use crate::exchange::types::Notifier;
use crate::exchange::Tracker;

use super::types::{Candidate, CandidateSource, CorrelationError, Reference, RetryPolicy, Signal};

/// `Correlator` finds the exchange token an inbound signal belongs to
pub struct Correlator<TNotifier>
where
    TNotifier: Notifier,
{
    tracker: Arc<Tracker<TNotifier>>,
}

impl<TNotifier> Correlator<TNotifier>
where
    TNotifier: Notifier,
{
    pub fn new(tracker: Arc<Tracker<TNotifier>>) -> Self {
        Self { tracker }
    }

    /// `resolve_by_token` accepts primary tokens and aliases
    pub async fn resolve_by_token(&self, token: String) -> Result<String, CorrelationError> {
        if self.tracker.lookup(token.clone()).await.is_ok() {
            return Ok(token);
        }

        self.tracker
            .resolve_alias(token.clone())
            .await
            .map_err(|_| CorrelationError::NotFound(format!("token: {}", token)))
    }

    /// `resolve_by_scan` is a linear search, the first candidate with a matching thread wins
    pub fn resolve_by_scan(
        &self,
        candidates: &[Candidate],
        thid: &str,
    ) -> Result<String, CorrelationError> {
        candidates
            .iter()
            .find(|candidate| candidate.thid == thid)
            .map(|candidate| candidate.token.to_owned())
            .ok_or(CorrelationError::NotFound(format!("thid: {}", thid)))
    }

    pub async fn resolve_with_retry<TSource>(
        &self,
        source: &TSource,
        thid: String,
        policy: &RetryPolicy,
    ) -> Result<String, CorrelationError>
    where
        TSource: CandidateSource + ?Sized,
    {
        for attempt in 0..policy.max_attempts {
            let candidates = source.candidates().await.map_err(|err| match err {
                CorrelationError::UpstreamUnavailable(_) => err,
                other => CorrelationError::UpstreamUnavailable(other.to_string()),
            })?;

            match self.resolve_by_scan(&candidates, &thid) {
                Ok(token) => return Ok(token),
                Err(_) if attempt + 1 < policy.max_attempts => {
                    let delay = policy.delay_for(attempt);
                    debug!(
                        "[correlator:resolve_with_retry] {} not listed yet, attempt: {}, waiting: {:?}",
                        thid,
                        attempt + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(_) => {}
            }
        }

        warn!(
            "[correlator:resolve_with_retry] {} unresolved after {} attempts",
            thid, policy.max_attempts
        );
        Err(CorrelationError::AmbiguousMatch(format!(
            "thid {} unresolved after {} attempts",
            thid, policy.max_attempts
        )))
    }

    /// `resolve` maps a signal to the exchange token it concerns
    ///
    /// Thread references fall back to a scan over the agent threads linked to
    /// pending exchanges
    pub async fn resolve(&self, signal: &Signal) -> Result<String, CorrelationError> {
        match &signal.reference {
            Reference::Token(token) => self.resolve_by_token(token.to_owned()).await,
            Reference::Thread(thid) => match self.resolve_by_token(thid.to_owned()).await {
                Ok(token) => Ok(token),
                Err(_) => {
                    let pending = self.tracker.candidates().await?;
                    self.resolve_by_scan(&pending, thid)
                }
            },
        }
    }
}

#[async_trait]
impl<TNotifier> CandidateSource for Tracker<TNotifier>
where
    TNotifier: Notifier,
{
    async fn candidates(&self) -> Result<Vec<Candidate>, CorrelationError> {
        let candidates = self
            .list_pending()
            .await
            .into_iter()
            .flat_map(|record| {
                let token = record.get_token();
                record
                    .get_threads()
                    .into_iter()
                    .map(move |thid| Candidate::new(token.clone(), thid))
            })
            .collect();

        Ok(candidates)
    }
}
