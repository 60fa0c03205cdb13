use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;

use prople_jsonrpc_core::types::{RpcError, RpcHandler, RpcHandlerOutput, RpcMethod};

use ssi_relay_core::correlation::types::RepoBuilder;
use ssi_relay_core::correlation::Store;

use super::rpc_method::Method;
use super::rpc_param::{Hint, Identity, Issuer, Param, VerifiedData};

/// `StoreHandler` serves identity lookups and the other correlation store records
pub struct StoreHandler<TRepo>
where
    TRepo: RepoBuilder,
{
    store: Arc<Store<TRepo>>,
}

impl<TRepo> Clone for StoreHandler<TRepo>
where
    TRepo: RepoBuilder,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<TRepo> StoreHandler<TRepo>
where
    TRepo: RepoBuilder,
{
    pub fn new(store: Arc<Store<TRepo>>) -> Self {
        Self { store }
    }

    async fn identity(&self, method: Method, param: Param) -> RpcHandlerOutput {
        let identity = match param {
            Param::Identity(identity) => identity,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, identity) {
            (Method::GetIdentity, Identity::Get { name }) => {
                let result = self
                    .store
                    .get_identity(name)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (Method::ListIdentities, Identity::List) => {
                let mut result = self.store.list_identities().await;
                result.sort_by_key(|identity| identity.get_name());

                Ok(Some(Box::new(result)))
            }
            (Method::UpsertIdentity, Identity::Upsert { name, did }) => {
                let result = self
                    .store
                    .upsert_identity(name, did)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (
                Method::CompareAndUpsertIdentity,
                Identity::CompareAndUpsert {
                    name,
                    expected_did,
                    did,
                },
            ) => {
                let result = self
                    .store
                    .compare_and_upsert_identity(name, expected_did, did)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn issuer(&self, method: Method, param: Param) -> RpcHandlerOutput {
        let issuer = match param {
            Param::Issuer(issuer) => issuer,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, issuer) {
            (Method::AddTrustedIssuer, Issuer::Add { id }) => {
                self.store
                    .add_trusted_issuer(id)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(None)
            }
            (Method::RemoveTrustedIssuer, Issuer::Remove { id }) => {
                self.store
                    .remove_trusted_issuer(id)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(None)
            }
            (Method::ListTrustedIssuers, Issuer::List) => {
                let mut result: Vec<String> =
                    self.store.trusted_issuers().await.into_iter().collect();
                result.sort();

                Ok(Some(Box::new(result)))
            }
            (Method::IsTrustedIssuer, Issuer::Check { id }) => {
                let result = self.store.is_trusted_issuer(id).await;
                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn hint(&self, method: Method, param: Param) -> RpcHandlerOutput {
        let hint = match param {
            Param::Hint(hint) => hint,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, hint) {
            (Method::PutExchangeHint, Hint::Put { key, hint }) => {
                self.store.put_exchange_hint(key, hint).await;
                Ok(None)
            }
            (Method::GetExchangeHint, Hint::Get { key }) => {
                let result = self
                    .store
                    .get_exchange_hint(key)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn verified_data(&self, method: Method, param: Param) -> RpcHandlerOutput {
        let verified_data = match param {
            Param::VerifiedData(verified_data) => verified_data,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, verified_data) {
            (Method::PutVerifiedData, VerifiedData::Put { id, data }) => {
                self.store
                    .put_verified_data(id, data)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(None)
            }
            (Method::GetVerifiedData, VerifiedData::Get { id }) => {
                let result = self
                    .store
                    .get_verified_data(id)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }
}

#[async_trait]
impl<TRepo> RpcHandler for StoreHandler<TRepo>
where
    TRepo: RepoBuilder + 'static,
{
    async fn call(&self, method: RpcMethod, params: Option<Value>) -> RpcHandlerOutput {
        let param_value = params.ok_or(RpcError::InvalidParams)?;
        let rpc_param = Param::try_from(param_value).map_err(|_| RpcError::ParseError)?;
        let rpc_method = Method::try_from(method).map_err(|_| RpcError::InternalError)?;

        match rpc_method {
            Method::GetIdentity
            | Method::ListIdentities
            | Method::UpsertIdentity
            | Method::CompareAndUpsertIdentity => self.identity(rpc_method, rpc_param).await,
            Method::AddTrustedIssuer
            | Method::RemoveTrustedIssuer
            | Method::ListTrustedIssuers
            | Method::IsTrustedIssuer => self.issuer(rpc_method, rpc_param).await,
            Method::PutExchangeHint | Method::GetExchangeHint => {
                self.hint(rpc_method, rpc_param).await
            }
            Method::PutVerifiedData | Method::GetVerifiedData => {
                self.verified_data(rpc_method, rpc_param).await
            }
        }
    }
}
