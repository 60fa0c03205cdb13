use std::sync::Arc;

use prople_jsonrpc_core::types::RpcRoute;

use ssi_relay_core::exchange::types::Notifier;
use ssi_relay_core::exchange::Tracker;

use crate::common::types::CommonError;
use crate::rpc::shared::rpc::method::build_rpc_method;
use crate::rpc::shared::types::RPCService;

mod handler;
mod rpc_method;
mod rpc_param;

pub use handler::ExchangeHandler;
pub use rpc_method::Method;
pub use rpc_param::Param;

/// `ExchangeService` exposes the exchange tracker, mostly for operators inspecting
/// in-flight exchanges and retrying failed notifications
pub struct ExchangeService<TNotifier>
where
    TNotifier: Notifier,
{
    tracker: Arc<Tracker<TNotifier>>,
    handler: Option<ExchangeHandler<TNotifier>>,
    routes: Vec<RpcRoute>,
}

impl<TNotifier> ExchangeService<TNotifier>
where
    TNotifier: Notifier + 'static,
{
    pub fn new(tracker: Arc<Tracker<TNotifier>>) -> Self {
        Self {
            tracker,
            handler: None,
            routes: Vec::new(),
        }
    }
}

impl<TNotifier> RPCService for ExchangeService<TNotifier>
where
    TNotifier: Notifier + 'static,
{
    fn build(&mut self) -> Result<(), CommonError> {
        self.handler = Some(ExchangeHandler::new(self.tracker.clone()));
        Ok(())
    }

    fn setup_rpc(&mut self) -> Result<(), CommonError> {
        let handler = self
            .handler
            .as_ref()
            .ok_or(CommonError::InternalError(String::from(
                "missing exchange handler",
            )))?;

        let controller = Box::new(handler.clone());
        for method in Method::all() {
            self.routes
                .push(RpcRoute::new(build_rpc_method(method), controller.clone()));
        }

        Ok(())
    }

    fn routes(&self) -> Vec<RpcRoute> {
        self.routes.clone()
    }
}
