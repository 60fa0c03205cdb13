use prople_jsonrpc_core::types::RpcRoute;

use crate::common::types::CommonError;

/// `RPCService` is implemented by every domain exposed through the JSON-RPC processor
pub trait RPCService {
    fn build(&mut self) -> Result<(), CommonError>;
    fn setup_rpc(&mut self) -> Result<(), CommonError>;
    fn routes(&self) -> Vec<RpcRoute>;
}
