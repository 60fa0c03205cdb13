use prople_jsonrpc_core::types::RpcRoute;

use ssi_relay_core::workflow::types::{HolderAPI, IssuerAPI, VerifierAPI, WebhookAPI};

use crate::common::types::CommonError;
use crate::rpc::shared::rpc::method::build_rpc_method;
use crate::rpc::shared::types::RPCService;

mod handler;
mod rpc_method;
mod rpc_param;

pub use handler::WorkflowHandler;
pub use rpc_method::{Holder as HolderMethod, Issuer as IssuerMethod, Method};
pub use rpc_method::{Verifier as VerifierMethod, Webhook as WebhookMethod};
pub use rpc_param::{Holder, Issuer, Param, Verifier, Webhook};

/// `WorkflowService` exposes the issuer, holder and verifier operations, plus the
/// webhook entry used when an agent event arrives through JSON-RPC instead of HTTP
pub struct WorkflowService<TWorkflow>
where
    TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI,
{
    workflow: TWorkflow,
    handler: Option<WorkflowHandler<TWorkflow>>,
    routes: Vec<RpcRoute>,
}

impl<TWorkflow> WorkflowService<TWorkflow>
where
    TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI + 'static,
{
    pub fn new(workflow: TWorkflow) -> Self {
        Self {
            workflow,
            handler: None,
            routes: Vec::new(),
        }
    }
}

impl<TWorkflow> RPCService for WorkflowService<TWorkflow>
where
    TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI + 'static,
{
    fn build(&mut self) -> Result<(), CommonError> {
        self.handler = Some(WorkflowHandler::new(self.workflow.clone()));
        Ok(())
    }

    fn setup_rpc(&mut self) -> Result<(), CommonError> {
        let handler = self
            .handler
            .as_ref()
            .ok_or(CommonError::InternalError(String::from(
                "missing workflow handler",
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
