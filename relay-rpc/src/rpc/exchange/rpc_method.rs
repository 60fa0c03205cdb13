use prople_jsonrpc_core::types::RpcMethod;

use crate::common::types::CommonError;
use crate::rpc::shared::rpc::method::RpcMethodBuilder;

const METHOD_BEGIN: &str = "exchange.begin";
const METHOD_ADVANCE: &str = "exchange.advance";
const METHOD_LOOKUP: &str = "exchange.lookup";
const METHOD_LIST_PENDING: &str = "exchange.list_pending";
const METHOD_RETRY_NOTIFICATION: &str = "exchange.retry_notification";
const METHOD_LINK_ALIAS: &str = "exchange.link_alias";
const METHOD_RESOLVE_ALIAS: &str = "exchange.resolve_alias";
const METHOD_LINK_THREAD: &str = "exchange.link_thread";

#[derive(Clone, Debug, PartialEq)]
pub enum Method {
    Begin,
    Advance,
    Lookup,
    ListPending,
    RetryNotification,
    LinkAlias,
    ResolveAlias,
    LinkThread,
}

impl Method {
    pub fn all() -> Vec<Method> {
        vec![
            Method::Begin,
            Method::Advance,
            Method::Lookup,
            Method::ListPending,
            Method::RetryNotification,
            Method::LinkAlias,
            Method::ResolveAlias,
            Method::LinkThread,
        ]
    }
}

impl RpcMethodBuilder for Method {
    fn build_path(&self) -> &str {
        match self {
            Method::Begin => METHOD_BEGIN,
            Method::Advance => METHOD_ADVANCE,
            Method::Lookup => METHOD_LOOKUP,
            Method::ListPending => METHOD_LIST_PENDING,
            Method::RetryNotification => METHOD_RETRY_NOTIFICATION,
            Method::LinkAlias => METHOD_LINK_ALIAS,
            Method::ResolveAlias => METHOD_RESOLVE_ALIAS,
            Method::LinkThread => METHOD_LINK_THREAD,
        }
    }
}

impl TryFrom<RpcMethod> for Method {
    type Error = CommonError;

    fn try_from(value: RpcMethod) -> Result<Self, Self::Error> {
        let given = value.to_string();
        Method::all()
            .into_iter()
            .find(|method| method.is_called_by(&given))
            .ok_or(CommonError::MethodError(format!("unknown method: {}", given)))
    }
}
