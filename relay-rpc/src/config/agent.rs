use std::time::Duration;

use reqwest::Url;

use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

/// `Agent` points to the identity agent instance of each party
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct Agent {
    pub(super) issuer_url: String,
    pub(super) holder_url: String,
    pub(super) verifier_url: String,
    pub(super) definition_registry_url: String,
    pub(super) timeout_secs: u64,
}

impl Agent {
    /// `get_urls` returns the issuer, holder and verifier base urls in that order
    pub fn get_urls(&self) -> (String, String, String) {
        (
            self.issuer_url.to_owned(),
            self.holder_url.to_owned(),
            self.verifier_url.to_owned(),
        )
    }

    pub fn get_definition_registry_url(&self) -> String {
        self.definition_registry_url.to_owned()
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            issuer_url: "".to_string(),
            holder_url: "".to_string(),
            verifier_url: "".to_string(),
            definition_registry_url: "".to_string(),
            timeout_secs: 10,
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), CommonError> {
    if value.is_empty() {
        return Err(CommonError::ValidationError(format!(
            "config: agent:{} is missing",
            field
        )));
    }

    Url::parse(value).map_err(|err| {
        CommonError::ValidationError(format!("config: agent:{} is invalid: {}", field, err))
    })?;

    Ok(())
}

impl ToValidate for Agent {
    fn validate(&self) -> Result<(), CommonError> {
        validate_url("issuer_url", &self.issuer_url)?;
        validate_url("holder_url", &self.holder_url)?;
        validate_url("verifier_url", &self.verifier_url)?;
        validate_url("definition_registry_url", &self.definition_registry_url)?;

        if self.timeout_secs == 0 {
            return Err(CommonError::ValidationError(
                "config: agent:timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
