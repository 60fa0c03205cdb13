use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use ssi_relay_core::agent::event::AgentEvent;
use ssi_relay_core::correlator::types::Signal;

use crate::common::types::CommonError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Issuer {
    RegisterIssuer {
        name: String,
    },
    OpenConnection {
        label: String,
        name: String,
    },
    OfferCredential {
        issuer_name: String,
        connection_id: String,
        credential_definition_id: String,
        claims: Value,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Holder {
    RotateIdentity {
        name: String,
    },
    AcceptInvitation {
        raw_invitation: String,
    },
    AcceptOffer {
        thid: String,
        holder_name: String,
    },
    AcceptPresentationRequest {
        presentation_thid: String,
        credential_thid: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Verifier {
    RequestPresentation {
        connection_id: String,
        level_required: u32,
        storage_id: String,
        credential_definition_id: Option<String>,
    },
    CompletePresentation {
        presentation_id: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Webhook {
    HandleEvent { event: AgentEvent },
    ApplySignal { signal: Signal },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "type", content = "payload")]
pub enum Param {
    Issuer(Issuer),
    Holder(Holder),
    Verifier(Verifier),
    Webhook(Webhook),
}

impl TryFrom<Value> for Param {
    type Error = CommonError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(|err| CommonError::JSONError(err.to_string()))
    }
}
