use std::time::Duration;

use rst_common::standard::serde::{self, Deserialize};

use ssi_relay_core::correlation::types::DuplicateDidPolicy;
use ssi_relay_core::correlator::types::RetryPolicy;

use crate::common::types::{CommonError, ToValidate};

/// `Correlation` tunes the duplicate DID policy of the store and the retry budget
/// used when polling the agent for a thread
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct Correlation {
    pub(super) duplicate_did: DuplicateDidPolicy,
    pub(super) max_attempts: u32,
    pub(super) initial_delay_ms: u64,
    pub(super) max_delay_ms: u64,
}

impl Correlation {
    pub fn get_policy(&self) -> DuplicateDidPolicy {
        self.duplicate_did
    }

    pub fn get_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl Default for Correlation {
    fn default() -> Self {
        Self {
            duplicate_did: DuplicateDidPolicy::default(),
            max_attempts: 5,
            initial_delay_ms: 200,
            max_delay_ms: 3000,
        }
    }
}

impl ToValidate for Correlation {
    fn validate(&self) -> Result<(), CommonError> {
        if self.max_attempts == 0 {
            return Err(CommonError::ValidationError(
                "config: correlation:max_attempts must be greater than zero".to_string(),
            ));
        }

        if self.initial_delay_ms > self.max_delay_ms {
            return Err(CommonError::ValidationError(
                "config: correlation:initial_delay_ms exceeds max_delay_ms".to_string(),
            ));
        }

        Ok(())
    }
}
