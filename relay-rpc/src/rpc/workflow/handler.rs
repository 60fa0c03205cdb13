use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;

use prople_jsonrpc_core::types::{RpcError, RpcHandler, RpcHandlerOutput, RpcMethod};

use ssi_relay_core::workflow::types::{HolderAPI, IssuerAPI, VerifierAPI, WebhookAPI};

use super::rpc_method::{
    Holder as HolderMethod, Issuer as IssuerMethod, Method, Verifier as VerifierMethod,
    Webhook as WebhookMethod,
};
use super::rpc_param::{Holder, Issuer, Param, Verifier, Webhook};

/// `WorkflowHandler` exposes the party operations of the issuer, the holder and the verifier
#[derive(Clone)]
pub struct WorkflowHandler<TWorkflow>
where
    TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI,
{
    workflow: TWorkflow,
}

impl<TWorkflow> WorkflowHandler<TWorkflow>
where
    TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI,
{
    pub fn new(workflow: TWorkflow) -> Self {
        Self { workflow }
    }

    async fn issuer(&self, method: IssuerMethod, param: Param) -> RpcHandlerOutput {
        let issuer = match param {
            Param::Issuer(issuer) => issuer,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, issuer) {
            (IssuerMethod::RegisterIssuer, Issuer::RegisterIssuer { name }) => {
                let result = self
                    .workflow
                    .register_issuer(name)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (IssuerMethod::OpenConnection, Issuer::OpenConnection { label, name }) => {
                let result = self
                    .workflow
                    .open_connection(label, name)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (
                IssuerMethod::OfferCredential,
                Issuer::OfferCredential {
                    issuer_name,
                    connection_id,
                    credential_definition_id,
                    claims,
                },
            ) => {
                let result = self
                    .workflow
                    .offer_credential(issuer_name, connection_id, credential_definition_id, claims)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn holder(&self, method: HolderMethod, param: Param) -> RpcHandlerOutput {
        let holder = match param {
            Param::Holder(holder) => holder,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, holder) {
            (HolderMethod::RotateIdentity, Holder::RotateIdentity { name }) => {
                let result = self
                    .workflow
                    .rotate_identity(name)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (HolderMethod::AcceptInvitation, Holder::AcceptInvitation { raw_invitation }) => {
                let result = self
                    .workflow
                    .accept_invitation(raw_invitation)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (HolderMethod::AcceptOffer, Holder::AcceptOffer { thid, holder_name }) => {
                let result = self
                    .workflow
                    .accept_offer(thid, holder_name)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (
                HolderMethod::AcceptPresentationRequest,
                Holder::AcceptPresentationRequest {
                    presentation_thid,
                    credential_thid,
                },
            ) => {
                let result = self
                    .workflow
                    .accept_presentation_request(presentation_thid, credential_thid)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn verifier(&self, method: VerifierMethod, param: Param) -> RpcHandlerOutput {
        let verifier = match param {
            Param::Verifier(verifier) => verifier,
            _ => return Err(RpcError::InvalidParams),
        };

        match (method, verifier) {
            (
                VerifierMethod::RequestPresentation,
                Verifier::RequestPresentation {
                    connection_id,
                    level_required,
                    storage_id,
                    credential_definition_id,
                },
            ) => {
                let result = self
                    .workflow
                    .request_presentation(
                        connection_id,
                        level_required,
                        storage_id,
                        credential_definition_id,
                    )
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            (
                VerifierMethod::CompletePresentation,
                Verifier::CompletePresentation { presentation_id },
            ) => {
                let result = self
                    .workflow
                    .complete_presentation(presentation_id)
                    .await
                    .map_err(|err| RpcError::HandlerError(err.to_string()))?;

                Ok(Some(Box::new(result)))
            }
            _ => Err(RpcError::InvalidParams),
        }
    }

    async fn webhook(&self, method: WebhookMethod, param: Param) -> RpcHandlerOutput {
        let webhook = match param {
            Param::Webhook(webhook) => webhook,
            _ => return Err(RpcError::InvalidParams),
        };

        let result = match (method, webhook) {
            (WebhookMethod::HandleEvent, Webhook::HandleEvent { event }) => {
                self.workflow.handle_event(event).await
            }
            (WebhookMethod::ApplySignal, Webhook::ApplySignal { signal }) => {
                self.workflow.apply_signal(signal).await
            }
            _ => return Err(RpcError::InvalidParams),
        }
        .map_err(|err| RpcError::HandlerError(err.to_string()))?;

        Ok(Some(Box::new(result)))
    }
}

#[async_trait]
impl<TWorkflow> RpcHandler for WorkflowHandler<TWorkflow>
where
    TWorkflow: IssuerAPI + HolderAPI + VerifierAPI + WebhookAPI + 'static,
{
    async fn call(&self, method: RpcMethod, params: Option<Value>) -> RpcHandlerOutput {
        let param_value = params.ok_or(RpcError::InvalidParams)?;
        let rpc_param = Param::try_from(param_value).map_err(|_| RpcError::ParseError)?;
        let rpc_method = Method::try_from(method).map_err(|_| RpcError::InternalError)?;

        match rpc_method {
            Method::Issuer(method) => self.issuer(method, rpc_param).await,
            Method::Holder(method) => self.holder(method, rpc_param).await,
            Method::Verifier(method) => self.verifier(method, rpc_param).await,
            Method::Webhook(method) => self.webhook(method, rpc_param).await,
        }
    }
}
