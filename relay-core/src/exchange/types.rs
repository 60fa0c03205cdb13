use std::fmt;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

/// `ExchangeError` provides all specific error types relate with the exchange tracker
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum ExchangeError {
    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("duplicate token: {0}")]
    DuplicateToken(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("notification failed: {0}")]
    NotificationFailed(String),

    #[error("notification is not pending: {0}")]
    NotificationNotPending(String),
}

/// `Stage` is the position of an exchange in the issue and present protocol
///
/// The non-failure stages are ordered, an exchange can only move forward. `Failed`
/// can be reached from every non-terminal stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum Stage {
    Initiated,
    OfferSent,
    OfferAccepted,
    PresentationRequested,
    PresentationAccepted,
    Verified,
    Failed,
}

impl Stage {
    fn rank(&self) -> Option<u8> {
        match self {
            Stage::Initiated => Some(0),
            Stage::OfferSent => Some(1),
            Stage::OfferAccepted => Some(2),
            Stage::PresentationRequested => Some(3),
            Stage::PresentationAccepted => Some(4),
            Stage::Verified => Some(5),
            Stage::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Verified | Stage::Failed)
    }

    /// `precedes` tells whether `other` comes strictly after this stage
    pub fn precedes(&self, other: &Stage) -> bool {
        match (self.rank(), other.rank()) {
            (Some(current), Some(target)) => current < target,
            _ => false,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Initiated => "Initiated",
            Stage::OfferSent => "OfferSent",
            Stage::OfferAccepted => "OfferAccepted",
            Stage::PresentationRequested => "PresentationRequested",
            Stage::PresentationAccepted => "PresentationAccepted",
            Stage::Verified => "Verified",
            Stage::Failed => "Failed",
        };

        write!(f, "{}", label)
    }
}

/// `Participant` is a weak reference to a party of an exchange, it only holds the key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "kind", content = "id")]
pub enum Participant {
    Identity(String),
    Issuer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum NotificationState {
    #[default]
    Idle,
    Pending,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum Topic {
    OfferReady,
    PresentationRequested,
    ExchangeCompleted,
}

/// `Notification` is the message sent to the intake endpoint of the next party
///
/// Only the correlation token travels, never the exchange payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Notification {
    pub topic: Topic,
    pub token: String,
    pub stage: Stage,
}

impl Notification {
    pub fn new(topic: Topic, token: String, stage: Stage) -> Self {
        Self {
            topic,
            token,
            stage,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, notification: Notification) -> Result<(), ExchangeError>;
}
