use rst_common::with_http_tokio::axum::routing::post;
use rst_common::with_http_tokio::axum::Router;
use rst_common::with_http_tokio::tower_http::timeout::TimeoutLayer;
use rst_common::with_http_tokio::tower_http::trace::TraceLayer;
use rst_common::with_logging::log::info;
use rst_common::with_tokio::tokio;
use rst_common::with_tracing::tracing_subscriber::{
    self, layer::SubscriberExt, util::SubscriberInitExt,
};

use prople_jsonrpc_axum::rpc::{Rpc as RpcAxum, RpcConfig, RpcError, RpcHandlerFn, RpcState};
use ssi_relay_rpc::RelayRPC;

use crate::errors::RelayError;

use super::webhook;

pub struct Rpc {
    config: String,
}

impl Rpc {
    pub fn new(config: String) -> Rpc {
        Self { config }
    }

    /// `serve` runs the JSON-RPC and webhook server until a shutdown signal arrives,
    /// then flushes the store
    pub async fn serve(&self) -> Result<(), RelayError> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    format!(
                        "{}=debug,ssi_relay_rpc=debug,ssi_relay_core=debug,tower_http=debug,axum=trace",
                        env!("CARGO_CRATE_NAME")
                    )
                    .into()
                }),
            )
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();

        let mut relay_rpc =
            RelayRPC::new(&self.config).map_err(|err| RelayError::RpcError(err.to_string()))?;

        relay_rpc
            .build()
            .await
            .map_err(|err| RelayError::RpcError(err.to_string()))?;

        let svc = self
            .svc(&relay_rpc)
            .map_err(|err| RelayError::RpcError(err.to_string()))?;

        tokio::select! {
            served = svc.serve() => {
                served.map_err(|err| RelayError::RpcError(err.to_string()))?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("[relayd:serve] shutdown signal received");
            }
        }

        let store = relay_rpc
            .store()
            .map_err(|err| RelayError::TeardownError(err.to_string()))?;

        store
            .teardown()
            .await
            .map_err(|err| RelayError::TeardownError(err.to_string()))
    }

    fn svc(&self, relay_rpc: &RelayRPC) -> Result<RpcAxum, RpcError> {
        let config_app = relay_rpc
            .build_app_config()
            .map_err(|err| RpcError::AxumError(err.to_string()))?;

        let processor = relay_rpc
            .processor()
            .map_err(|err| RpcError::AxumError(err.to_string()))?;

        let usecase = relay_rpc
            .usecase()
            .map_err(|err| RpcError::AxumError(err.to_string()))?;

        let webhook_app = Router::new()
            .route("/webhook", post(webhook::receive))
            .with_state(usecase);

        let rpc_state = RpcState::new(processor);
        let rpc_app = Router::new()
            .route("/rpc", post(RpcHandlerFn))
            .merge(webhook_app)
            .layer((
                TraceLayer::new_for_http(),
                TimeoutLayer::new(config_app.get_request_timeout()),
            ));

        let (host, port) = config_app.get_app_config();
        let axum_config = RpcConfig::new(host, port);

        Ok(RpcAxum::new(axum_config, rpc_state, rpc_app))
    }
}
