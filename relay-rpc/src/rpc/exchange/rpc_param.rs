use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use ssi_relay_core::exchange::types::{Participant, Stage};

use crate::common::types::CommonError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Param {
    Begin {
        token: String,
        participants: Vec<Participant>,
    },
    Advance {
        token: String,
        stage: Stage,
        payload: Option<Value>,
    },
    Lookup {
        token: String,
    },
    ListPending,
    RetryNotification {
        token: String,
    },
    LinkAlias {
        token: String,
        alias: String,
    },
    ResolveAlias {
        alias: String,
    },
    LinkThread {
        token: String,
        thid: String,
    },
}

impl TryFrom<Value> for Param {
    type Error = CommonError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(|err| CommonError::JSONError(err.to_string()))
    }
}
