use std::sync::Arc;

use prople_jsonrpc_core::objects::RpcProcessor;

use ssi_relay_core::exchange::types::Notifier;
use ssi_relay_core::exchange::Tracker;
use ssi_relay_core::workflow::types::{HolderAPI, IssuerAPI, VerifierAPI, WebhookAPI};

use crate::common::types::CommonError;

use super::exchange::ExchangeService;
use super::shared::types::RPCService;
use super::store::StoreService;
use super::workflow::WorkflowService;
use super::RelayStore;

/// `Manager` collects the routes of every service into a single processor
pub struct Manager {
    processor: RpcProcessor,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    pub fn new() -> Self {
        let processor = RpcProcessor::default();
        Self { processor }
    }

    pub fn build_store_service(
        &mut self,
        store: Arc<RelayStore>,
    ) -> Result<&mut Self, CommonError> {
        let mut store_rpc = StoreService::new(store);
        self.register("store", &mut store_rpc)
    }

    pub fn build_exchange_service<TNotifier>(
        &mut self,
        tracker: Arc<Tracker<TNotifier>>,
    ) -> Result<&mut Self, CommonError>
    where
        TNotifier: Notifier + 'static,
    {
        let mut exchange_rpc = ExchangeService::new(tracker);
        self.register("exchange", &mut exchange_rpc)
    }

    pub fn build_workflow_service<TWorkflow>(
        &mut self,
        workflow: TWorkflow,
    ) -> Result<&mut Self, CommonError>
    where
        TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI + 'static,
    {
        let mut workflow_rpc = WorkflowService::new(workflow);
        self.register("workflow", &mut workflow_rpc)
    }

    pub fn processor(&self) -> RpcProcessor {
        self.processor.clone()
    }

    fn register(
        &mut self,
        name: &str,
        service: &mut impl RPCService,
    ) -> Result<&mut Self, CommonError> {
        service.build()?;
        service.setup_rpc()?;

        let routes = service.routes();
        if routes.is_empty() {
            return Err(CommonError::RpcError(format!(
                "{} doesn't have any routes",
                name
            )));
        }

        for route in routes.iter() {
            self.processor.register_route(route.clone());
        }

        Ok(self)
    }
}
