use prople_jsonrpc_core::types::RpcMethod;

pub const RPC_METHOD_PREFIX: &str = "ssi.relay";

pub trait RpcMethodBuilder {
    fn build_path(&self) -> &str;

    /// `is_called_by` tells whether an incoming method name routes to this method,
    /// with or without the `ssi.relay` prefix
    fn is_called_by(&self, given: &str) -> bool {
        given.ends_with(self.build_path())
    }
}

pub fn build_rpc_method(method: impl RpcMethodBuilder) -> RpcMethod {
    RpcMethod::from(format!("{}.{}", RPC_METHOD_PREFIX, method.build_path()))
}
