use std::sync::Arc;

use prople_jsonrpc_core::types::RpcRoute;

use ssi_relay_core::correlation::Store;

use crate::common::types::CommonError;
use crate::rpc::shared::rpc::method::build_rpc_method;
use crate::rpc::shared::types::RPCService;

mod handler;
mod repository;
mod rpc_method;
mod rpc_param;

pub use handler::StoreHandler;
pub use repository::Repository;
pub use rpc_method::Method;
pub use rpc_param::{Hint, Identity, Issuer, Param, VerifiedData};

/// `StoreService` exposes the correlation store as the identity lookup service
pub struct StoreService {
    store: Arc<Store<Repository>>,
    handler: Option<StoreHandler<Repository>>,
    routes: Vec<RpcRoute>,
}

impl StoreService {
    pub fn new(store: Arc<Store<Repository>>) -> Self {
        Self {
            store,
            handler: None,
            routes: Vec::new(),
        }
    }
}

impl RPCService for StoreService {
    fn build(&mut self) -> Result<(), CommonError> {
        self.handler = Some(StoreHandler::new(self.store.clone()));
        Ok(())
    }

    fn setup_rpc(&mut self) -> Result<(), CommonError> {
        let handler = self
            .handler
            .as_ref()
            .ok_or(CommonError::InternalError(String::from(
                "missing store handler",
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
