use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;

use prople_jsonrpc_core::types::{RpcError, RpcHandler, RpcHandlerOutput, RpcMethod};

use ssi_relay_core::exchange::types::Notifier;
use ssi_relay_core::exchange::Tracker;

use super::rpc_method::Method;
use super::rpc_param::Param;

pub struct ExchangeHandler<TNotifier>
where
    TNotifier: Notifier,
{
    tracker: Arc<Tracker<TNotifier>>,
}

impl<TNotifier> Clone for ExchangeHandler<TNotifier>
where
    TNotifier: Notifier,
{
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
        }
    }
}

impl<TNotifier> ExchangeHandler<TNotifier>
where
    TNotifier: Notifier,
{
    pub fn new(tracker: Arc<Tracker<TNotifier>>) -> Self {
        Self { tracker }
    }

    async fn begin(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::Begin {
                token,
                participants,
            } => {
                let result = self
                    .tracker
                    .begin_exchange(token, participants)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn advance(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::Advance {
                token,
                stage,
                payload,
            } => {
                let result = self
                    .tracker
                    .advance(token, stage, payload)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn lookup(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::Lookup { token } => {
                let result = self
                    .tracker
                    .lookup(token)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn list_pending(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::ListPending => {
                let mut result = self.tracker.list_pending().await;
                result.sort_by_key(|record| record.get_created_at());

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn retry_notification(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::RetryNotification { token } => {
                let result = self
                    .tracker
                    .retry_notification(token)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn link_alias(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::LinkAlias { token, alias } => {
                self.tracker
                    .link_alias(token, alias)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(None)
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn resolve_alias(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::ResolveAlias { alias } => {
                let result = self
                    .tracker
                    .resolve_alias(alias)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn link_thread(&self, param: Param) -> RpcHandlerOutput {
        match param {
            Param::LinkThread { token, thid } => {
                let result = self
                    .tracker
                    .link_thread(token, thid)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }
}

#[async_trait]
impl<TNotifier> RpcHandler for ExchangeHandler<TNotifier>
where
    TNotifier: Notifier + 'static,
{
    async fn call(&self, method: RpcMethod, params: Option<Value>) -> RpcHandlerOutput {
        let param_value = params.ok_or(RpcError::InvalidParams)?;
        let rpc_param = Param::try_from(param_value).map_err(|_| RpcError::ParseError)?;
        let rpc_method = Method::try_from(method).map_err(|_| RpcError::InternalError)?;

        match rpc_method {
            Method::Begin => self.begin(rpc_param).await,
            Method::Advance => self.advance(rpc_param).await,
            Method::Lookup => self.lookup(rpc_param).await,
            Method::ListPending => self.list_pending(rpc_param).await,
            Method::RetryNotification => self.retry_notification(rpc_param).await,
            Method::LinkAlias => self.link_alias(rpc_param).await,
            Method::ResolveAlias => self.resolve_alias(rpc_param).await,
            Method::LinkThread => self.link_thread(rpc_param).await,
        }
    }
}
