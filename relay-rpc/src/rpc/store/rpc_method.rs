use prople_jsonrpc_core::types::RpcMethod;

use crate::common::types::CommonError;
use crate::rpc::shared::rpc::method::RpcMethodBuilder;

const METHOD_GET_IDENTITY: &str = "store.identity.get";
const METHOD_LIST_IDENTITIES: &str = "store.identity.list";
const METHOD_UPSERT_IDENTITY: &str = "store.identity.upsert";
const METHOD_COMPARE_AND_UPSERT_IDENTITY: &str = "store.identity.compare_and_upsert";
const METHOD_ADD_TRUSTED_ISSUER: &str = "store.issuer.add";
const METHOD_REMOVE_TRUSTED_ISSUER: &str = "store.issuer.remove";
const METHOD_LIST_TRUSTED_ISSUERS: &str = "store.issuer.list";
const METHOD_IS_TRUSTED_ISSUER: &str = "store.issuer.check";
const METHOD_PUT_EXCHANGE_HINT: &str = "store.hint.put";
const METHOD_GET_EXCHANGE_HINT: &str = "store.hint.get";
const METHOD_PUT_VERIFIED_DATA: &str = "store.verified_data.put";
const METHOD_GET_VERIFIED_DATA: &str = "store.verified_data.get";

#[derive(Clone, Debug, PartialEq)]
pub enum Method {
    GetIdentity,
    ListIdentities,
    UpsertIdentity,
    CompareAndUpsertIdentity,
    AddTrustedIssuer,
    RemoveTrustedIssuer,
    ListTrustedIssuers,
    IsTrustedIssuer,
    PutExchangeHint,
    GetExchangeHint,
    PutVerifiedData,
    GetVerifiedData,
}

impl Method {
    pub fn all() -> Vec<Method> {
        vec![
            Method::GetIdentity,
            Method::ListIdentities,
            Method::UpsertIdentity,
            Method::CompareAndUpsertIdentity,
            Method::AddTrustedIssuer,
            Method::RemoveTrustedIssuer,
            Method::ListTrustedIssuers,
            Method::IsTrustedIssuer,
            Method::PutExchangeHint,
            Method::GetExchangeHint,
            Method::PutVerifiedData,
            Method::GetVerifiedData,
        ]
    }
}

impl RpcMethodBuilder for Method {
    fn build_path(&self) -> &str {
        match self {
            Method::GetIdentity => METHOD_GET_IDENTITY,
            Method::ListIdentities => METHOD_LIST_IDENTITIES,
            Method::UpsertIdentity => METHOD_UPSERT_IDENTITY,
            Method::CompareAndUpsertIdentity => METHOD_COMPARE_AND_UPSERT_IDENTITY,
            Method::AddTrustedIssuer => METHOD_ADD_TRUSTED_ISSUER,
            Method::RemoveTrustedIssuer => METHOD_REMOVE_TRUSTED_ISSUER,
            Method::ListTrustedIssuers => METHOD_LIST_TRUSTED_ISSUERS,
            Method::IsTrustedIssuer => METHOD_IS_TRUSTED_ISSUER,
            Method::PutExchangeHint => METHOD_PUT_EXCHANGE_HINT,
            Method::GetExchangeHint => METHOD_GET_EXCHANGE_HINT,
            Method::PutVerifiedData => METHOD_PUT_VERIFIED_DATA,
            Method::GetVerifiedData => METHOD_GET_VERIFIED_DATA,
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
