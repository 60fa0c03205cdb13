use std::time::Duration;

use reqwest::Client;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, warn};

use ssi_relay_core::exchange::types::{ExchangeError, Notification, Notifier};

use crate::common::types::CommonError;
use crate::config::Notification as NotificationConfig;

/// `HttpNotifier` posts each notification to the intake endpoint configured for its topic
///
/// A failed delivery is reported once, retrying is left to the caller
#[derive(Clone)]
pub struct HttpNotifier {
    client: Client,
    endpoints: NotificationConfig,
}

impl HttpNotifier {
    pub fn new(endpoints: NotificationConfig, timeout: Duration) -> Result<Self, CommonError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CommonError::InternalError(err.to_string()))?;

        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), ExchangeError> {
        let endpoint = self.endpoints.get_endpoint(notification.topic);
        debug!(
            "[notifier:notify] {:?} for {} to {}",
            notification.topic, notification.token, endpoint
        );

        let response = self
            .client
            .post(endpoint.clone())
            .json(&notification)
            .send()
            .await
            .map_err(|err| ExchangeError::NotificationFailed(err.to_string()))?;

        if !response.status().is_success() {
            warn!(
                "[notifier:notify] {} rejected {}: {}",
                endpoint,
                notification.token,
                response.status()
            );
            return Err(ExchangeError::NotificationFailed(format!(
                "{} answered {}",
                endpoint,
                response.status()
            )));
        }

        Ok(())
    }
}
