use rst_common::standard::serde::{self, Deserialize};

use ssi_relay_core::exchange::types::Topic;

use crate::common::types::{CommonError, ToValidate};

/// `Notification` maps each notification topic to the intake endpoint of the next party
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Notification {
    pub(super) offer_ready_url: String,
    pub(super) presentation_requested_url: String,
    pub(super) exchange_completed_url: String,
}

impl Notification {
    pub fn get_endpoint(&self, topic: Topic) -> String {
        match topic {
            Topic::OfferReady => self.offer_ready_url.to_owned(),
            Topic::PresentationRequested => self.presentation_requested_url.to_owned(),
            Topic::ExchangeCompleted => self.exchange_completed_url.to_owned(),
        }
    }
}

impl ToValidate for Notification {
    fn validate(&self) -> Result<(), CommonError> {
        let endpoints = [
            ("offer_ready_url", &self.offer_ready_url),
            ("presentation_requested_url", &self.presentation_requested_url),
            ("exchange_completed_url", &self.exchange_completed_url),
        ];

        for (field, value) in endpoints {
            if value.is_empty() {
                return Err(CommonError::ValidationError(format!(
                    "config: notification:{} is missing",
                    field
                )));
            }
        }

        Ok(())
    }
}
