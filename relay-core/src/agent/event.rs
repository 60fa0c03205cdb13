use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;

use crate::correlator::types::{Reference, Signal};
use crate::exchange::types::Stage;

use super::types::AgentError;

/// `AgentEvent` is the webhook payload emitted by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct AgentEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: Value,
}

/// `EventAction` is what the relay should do with an [`AgentEvent`]
#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    ConnectionAcknowledged(String),
    Advance(Signal),
    CompletePresentation(String),
    Ignore,
}

impl AgentEvent {
    pub fn new(kind: String, data: Value) -> Self {
        Self { kind, data }
    }

    pub fn to_action(&self) -> Result<EventAction, AgentError> {
        match self.kind.as_str() {
            "ConnectionUpdated" => self.connection_action(),
            "IssueCredentialRecordUpdated" => self.credential_action(),
            "PresentationUpdated" => self.presentation_action(),
            _ => Ok(EventAction::Ignore),
        }
    }

    fn connection_action(&self) -> Result<EventAction, AgentError> {
        if self.field("state").as_deref() != Some("ConnectionResponseSent") {
            return Ok(EventAction::Ignore);
        }

        let connection_id = self.required("connectionId")?;
        Ok(EventAction::ConnectionAcknowledged(connection_id))
    }

    fn credential_action(&self) -> Result<EventAction, AgentError> {
        let state = self.field("protocolState").unwrap_or_default();
        let stage = match state.as_str() {
            "OfferSent" => Stage::OfferSent,
            "RequestReceived" | "CredentialSent" | "CredentialReceived" => Stage::OfferAccepted,
            problem if problem.starts_with("ProblemReport") => Stage::Failed,
            _ => return Ok(EventAction::Ignore),
        };

        let thid = self.required("thid")?;
        Ok(EventAction::Advance(Signal::new(
            Reference::Thread(thid),
            Some(stage),
        )))
    }

    fn presentation_action(&self) -> Result<EventAction, AgentError> {
        let status = self.field("status").unwrap_or_default();
        let stage = match status.as_str() {
            "PresentationVerified" => {
                let presentation_id = self.required("presentationId")?;
                return Ok(EventAction::CompletePresentation(presentation_id));
            }
            "RequestSent" => Stage::PresentationRequested,
            "PresentationSent" | "PresentationReceived" => Stage::PresentationAccepted,
            "PresentationVerificationFailed" => Stage::Failed,
            rejected if rejected.ends_with("Rejected") => Stage::Failed,
            _ => return Ok(EventAction::Ignore),
        };

        let reference = match self.field("thid") {
            Some(thid) => Reference::Thread(thid),
            None => Reference::Token(self.required("presentationId")?),
        };

        Ok(EventAction::Advance(Signal::new(reference, Some(stage))))
    }

    fn field(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(|value| value.as_str())
            .map(|value| value.to_string())
    }

    fn required(&self, key: &str) -> Result<String, AgentError> {
        self.field(key).ok_or(AgentError::InvalidResponse(format!(
            "{}: missing data.{}",
            self.kind, key
        )))
    }
}
