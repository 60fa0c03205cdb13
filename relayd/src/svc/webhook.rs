use rst_common::standard::serde_json::{json, Value};
use rst_common::with_http_tokio::axum::extract::State;
use rst_common::with_http_tokio::axum::http::StatusCode;
use rst_common::with_http_tokio::axum::Json;
use rst_common::with_logging::log::{debug, warn};

use ssi_relay_core::agent::event::AgentEvent;
use ssi_relay_core::workflow::types::WebhookAPI;
use ssi_relay_rpc::rpc::RelayUsecase;

/// `receive` takes an agent event and applies it to the exchange it belongs to
///
/// Events the relay cannot apply are still acknowledged unless the failure is
/// transient, so the agent only redelivers what may succeed later
pub async fn receive(
    State(usecase): State<RelayUsecase>,
    Json(event): Json<AgentEvent>,
) -> (StatusCode, Json<Value>) {
    debug!("[webhook:receive] {}", event.kind);

    match usecase.handle_event(event).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(json!({"status": "applied", "token": record.get_token(), "stage": record.get_stage()})),
        ),
        Ok(None) => (StatusCode::OK, Json(json!({"status": "ignored"}))),
        Err(err) if err.is_retryable() => {
            warn!("[webhook:receive] retryable failure: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "failed", "error": err.to_string()})),
            )
        }
        Err(err) => {
            warn!("[webhook:receive] rejected: {}", err);
            (
                StatusCode::OK,
                Json(json!({"status": "rejected", "error": err.to_string()})),
            )
        }
    }
}
