use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

use super::{Agent, App, Correlation, Database, Notification};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Config {
    pub(super) database: Database,
    pub(super) app: App,
    pub(super) agent: Agent,
    pub(super) notification: Notification,

    #[serde(default)]
    pub(super) correlation: Correlation,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn db(&self) -> &Database {
        &self.database
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn correlation(&self) -> &Correlation {
        &self.correlation
    }
}

impl ToValidate for Config {
    fn validate(&self) -> Result<(), CommonError> {
        self.app.validate()?;
        self.database.validate()?;
        self.agent.validate()?;
        self.notification.validate()?;
        self.correlation.validate()?;

        // two agent calls and the terminal notification may share one request
        let budget = self.agent.get_timeout() * 3;
        if self.app.get_request_timeout() <= budget {
            return Err(CommonError::ValidationError(format!(
                "config: app:request_timeout_secs must exceed {}s",
                budget.as_secs()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;
    use std::path::PathBuf;

    use rstdev_config::format::use_toml;
    use rstdev_config::parser::from_file;
    use rstdev_config::{types::ConfigError, Builder};

    use crate::common::helpers;
    use crate::common::types::CommonError;

    #[test]
    fn test_validation_failed() {
        let cfg = Config::new();
        let validation = helpers::validate(cfg);
        assert!(validation.is_err());
        assert!(matches!(
            validation.unwrap_err(),
            CommonError::ValidationError(_)
        ))
    }

    #[test]
    fn test_request_timeout_below_agent_budget() -> Result<(), ConfigError> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("src/config/fixtures");

        let toml_file = format!("{}/config.toml", path.display());
        let parsed: Result<Config, ConfigError> =
            Builder::new(from_file(toml_file)).fetch()?.parse(use_toml);
        assert!(!parsed.is_err());

        let mut cfg = parsed.unwrap();
        assert!(helpers::validate(cfg.clone()).is_ok());

        cfg.app.request_timeout_secs = 45;
        let validation = helpers::validate(cfg);
        assert!(validation
            .unwrap_err()
            .to_string()
            .contains("app:request_timeout_secs"));
        Ok(())
    }
}
