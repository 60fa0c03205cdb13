use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::{ExchangeError, NotificationState, Participant, Stage};

/// `Transition` is the outcome of checking a requested stage against the current one
#[derive(Debug, PartialEq)]
pub(crate) enum Transition {
    Unchanged,
    Advance,
}

/// `ExchangeRecord` is the state of one protocol run, identified by its thread token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct ExchangeRecord {
    token: String,
    stage: Stage,
    participants: Vec<Participant>,
    payload: Value,
    notification: NotificationState,

    #[serde(default)]
    threads: Vec<String>,

    #[serde(with = "ts_seconds")]
    created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    updated_at: DateTime<Utc>,
}

impl ExchangeRecord {
    pub fn new(token: String, participants: Vec<Participant>) -> Self {
        Self {
            token,
            participants,
            stage: Stage::Initiated,
            payload: Value::Null,
            notification: NotificationState::Idle,
            threads: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn get_token(&self) -> String {
        self.token.to_owned()
    }

    pub fn get_stage(&self) -> Stage {
        self.stage
    }

    pub fn get_participants(&self) -> Vec<Participant> {
        self.participants.to_owned()
    }

    pub fn get_payload(&self) -> Value {
        self.payload.to_owned()
    }

    pub fn get_notification(&self) -> NotificationState {
        self.notification
    }

    /// `get_threads` lists the agent thread ids linked to this exchange
    pub fn get_threads(&self) -> Vec<String> {
        self.threads.to_owned()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn check_transition(&self, target: Stage) -> Result<Transition, ExchangeError> {
        if target == self.stage {
            return Ok(Transition::Unchanged);
        }

        let allowed = match target {
            Stage::Failed => !self.stage.is_terminal(),
            _ => self.stage.precedes(&target),
        };

        if !allowed {
            return Err(ExchangeError::InvalidTransition {
                from: self.stage,
                to: target,
            });
        }

        Ok(Transition::Advance)
    }

    pub(crate) fn apply(&mut self, target: Stage, payload: Option<Value>) {
        self.stage = target;
        if let Some(incoming) = payload {
            self.merge_payload(incoming);
        }
        self.updated_at = Utc::now();
    }

    /// `claim_notification` moves an idle terminal record into `Pending`
    ///
    /// Returns `true` for exactly one caller per terminal transition
    pub(crate) fn claim_notification(&mut self) -> bool {
        if !self.stage.is_terminal() || self.notification != NotificationState::Idle {
            return false;
        }

        self.notification = NotificationState::Pending;
        true
    }

    pub(crate) fn set_notification(&mut self, state: NotificationState) {
        self.notification = state;
        self.updated_at = Utc::now();
    }

    pub(crate) fn add_thread(&mut self, thid: String) -> bool {
        if thid == self.token || self.threads.contains(&thid) {
            return false;
        }

        self.threads.push(thid);
        self.updated_at = Utc::now();
        true
    }

    fn merge_payload(&mut self, incoming: Value) {
        match (&mut self.payload, incoming) {
            (_, Value::Null) => {}
            (Value::Object(current), Value::Object(fields)) => {
                current.extend(fields);
            }
            (current, replacement) => {
                *current = replacement;
            }
        }
    }
}

impl ToJSON for ExchangeRecord {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}
