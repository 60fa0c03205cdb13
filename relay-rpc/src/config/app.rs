use std::time::Duration;

use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct App {
    pub(super) host: String,
    pub(super) port: String,

    #[serde(default = "default_request_timeout")]
    pub(super) request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    60
}

impl App {
    pub fn get_app_config(&self) -> (String, String) {
        (self.host.to_owned(), self.port.to_owned())
    }

    /// `get_request_timeout` bounds a whole inbound request, agent calls and notifications included
    pub fn get_request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for App {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: "8080".to_string(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ToValidate for App {
    fn validate(&self) -> Result<(), CommonError> {
        if self.host.is_empty() {
            return Err(CommonError::ValidationError(
                "config: app:host is missing".to_string(),
            ));
        }

        if self.port.parse::<u16>().is_err() {
            return Err(CommonError::ValidationError(format!(
                "config: app:port is invalid: {}",
                self.port
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

    #[test]
    fn test_parse_app_config() -> Result<(), ConfigError> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("src/config/fixtures");

        let toml_file = format!("{}/config_app.toml", path.display());
        let config_toml = {
            let config_builder: Result<App, ConfigError> =
                Builder::new(from_file(toml_file)).fetch()?.parse(use_toml);

            config_builder
        };

        assert!(!config_toml.is_err());

        let config_app = config_toml.unwrap();
        assert_eq!(config_app.host, "localhost".to_string());
        assert_eq!(config_app.port, "8181".to_string());
        assert_eq!(config_app.get_request_timeout(), Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn test_invalid_port() {
        let mut app = App::default();
        app.port = "relay".to_string();

        let validation = helpers::validate(app);
        assert!(validation.is_err());
        assert!(validation.unwrap_err().to_string().contains("app:port"))
    }
}
