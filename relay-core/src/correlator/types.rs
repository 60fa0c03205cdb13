use std::time::Duration;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use crate::exchange::types::Stage;

/// `CorrelationError` provides all specific error types relate with the event correlator
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum CorrelationError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous match: {0}")]
    AmbiguousMatch(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// `Candidate` is one entry of a collaborator listing, an agent record id paired with
/// the thread it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Candidate {
    pub token: String,
    pub thid: String,
}

impl Candidate {
    pub fn new(token: String, thid: String) -> Self {
        Self { token, thid }
    }
}

/// `CandidateSource` produces the candidate list scanned when a signal only carries a thread id
///
/// The list order is kept as the collaborator returned it
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(&self) -> Result<Vec<Candidate>, CorrelationError>;
}

/// `RetryPolicy` bounds the exponential backoff used while waiting for a record to show up
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
        }
    }

    /// `delay_for` returns the wait before the given retry, `attempt` starts from zero
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum Reference {
    Token(String),
    Thread(String),
}

/// `Signal` is an inbound event, whichever channel produced it
///
/// A webhook and a poll response both end up as a `Signal`, the tracker never learns
/// which one fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Signal {
    pub reference: Reference,
    pub stage: Option<Stage>,
    pub payload: Option<Value>,
}

impl Signal {
    pub fn new(reference: Reference, stage: Option<Stage>) -> Self {
        Self {
            reference,
            stage,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_delay_is_capped() {
        let policy = RetryPolicy::new(
            10,
            Duration::from_millis(100),
            Duration::from_millis(500),
        );

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));
    }
}
