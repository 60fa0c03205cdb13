use prople_jsonrpc_core::types::RpcMethod;

use crate::common::types::CommonError;
use crate::rpc::shared::rpc::method::RpcMethodBuilder;

const METHOD_REGISTER_ISSUER: &str = "workflow.issuer.register_issuer";
const METHOD_OPEN_CONNECTION: &str = "workflow.issuer.open_connection";
const METHOD_OFFER_CREDENTIAL: &str = "workflow.issuer.offer_credential";
const METHOD_ROTATE_IDENTITY: &str = "workflow.holder.rotate_identity";
const METHOD_ACCEPT_INVITATION: &str = "workflow.holder.accept_invitation";
const METHOD_ACCEPT_OFFER: &str = "workflow.holder.accept_offer";
const METHOD_ACCEPT_PRESENTATION_REQUEST: &str = "workflow.holder.accept_presentation_request";
const METHOD_REQUEST_PRESENTATION: &str = "workflow.verifier.request_presentation";
const METHOD_COMPLETE_PRESENTATION: &str = "workflow.verifier.complete_presentation";
const METHOD_HANDLE_EVENT: &str = "workflow.webhook.handle_event";
const METHOD_APPLY_SIGNAL: &str = "workflow.webhook.apply_signal";

#[derive(Clone, Debug, PartialEq)]
pub enum Issuer {
    RegisterIssuer,
    OpenConnection,
    OfferCredential,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Holder {
    RotateIdentity,
    AcceptInvitation,
    AcceptOffer,
    AcceptPresentationRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Verifier {
    RequestPresentation,
    CompletePresentation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Webhook {
    HandleEvent,
    ApplySignal,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Method {
    Issuer(Issuer),
    Holder(Holder),
    Verifier(Verifier),
    Webhook(Webhook),
}

impl Method {
    pub fn all() -> Vec<Method> {
        vec![
            Method::Issuer(Issuer::RegisterIssuer),
            Method::Issuer(Issuer::OpenConnection),
            Method::Issuer(Issuer::OfferCredential),
            Method::Holder(Holder::RotateIdentity),
            Method::Holder(Holder::AcceptInvitation),
            Method::Holder(Holder::AcceptOffer),
            Method::Holder(Holder::AcceptPresentationRequest),
            Method::Verifier(Verifier::RequestPresentation),
            Method::Verifier(Verifier::CompletePresentation),
            Method::Webhook(Webhook::HandleEvent),
            Method::Webhook(Webhook::ApplySignal),
        ]
    }
}

impl RpcMethodBuilder for Method {
    fn build_path(&self) -> &str {
        match self {
            Method::Issuer(issuer) => match issuer {
                Issuer::RegisterIssuer => METHOD_REGISTER_ISSUER,
                Issuer::OpenConnection => METHOD_OPEN_CONNECTION,
                Issuer::OfferCredential => METHOD_OFFER_CREDENTIAL,
            },
            Method::Holder(holder) => match holder {
                Holder::RotateIdentity => METHOD_ROTATE_IDENTITY,
                Holder::AcceptInvitation => METHOD_ACCEPT_INVITATION,
                Holder::AcceptOffer => METHOD_ACCEPT_OFFER,
                Holder::AcceptPresentationRequest => METHOD_ACCEPT_PRESENTATION_REQUEST,
            },
            Method::Verifier(verifier) => match verifier {
                Verifier::RequestPresentation => METHOD_REQUEST_PRESENTATION,
                Verifier::CompletePresentation => METHOD_COMPLETE_PRESENTATION,
            },
            Method::Webhook(webhook) => match webhook {
                Webhook::HandleEvent => METHOD_HANDLE_EVENT,
                Webhook::ApplySignal => METHOD_APPLY_SIGNAL,
            },
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

#[cfg(test)]
mod tests {
    use super::*;
    use table_test::table_test;

    use crate::rpc::shared::rpc::method::build_rpc_method;

    #[test]
    fn test_from_rpc_method() {
        let table: Vec<(RpcMethod, Method)> = Method::all()
            .into_iter()
            .map(|method| (build_rpc_method(method.clone()), method))
            .collect();

        for (validator, input, expected) in table_test!(table) {
            let from_method = Method::try_from(input.clone());
            assert!(!from_method.is_err());

            validator
                .given(&format!("{:?}", input))
                .when("cast back")
                .then("back to original form")
                .assert_eq(expected, from_method.unwrap());
        }
    }

    #[test]
    fn test_method_path() {
        let method = build_rpc_method(Method::Verifier(Verifier::RequestPresentation));
        assert_eq!(
            method.to_string(),
            "ssi.relay.workflow.verifier.request_presentation".to_string()
        )
    }

    #[test]
    fn test_from_rpc_method_error() {
        let from_method = Method::try_from(RpcMethod::from("ssi.relay.workflow.issuer.revoke"));
        assert!(matches!(
            from_method.unwrap_err(),
            CommonError::MethodError(_)
        ))
    }
}
