use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use ssi_relay_core::correlation::types::ExchangeHint;

use crate::common::types::CommonError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Identity {
    Get {
        name: String,
    },
    List,
    Upsert {
        name: String,
        did: String,
    },
    CompareAndUpsert {
        name: String,
        expected_did: Option<String>,
        did: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Issuer {
    Add { id: String },
    Remove { id: String },
    List,
    Check { id: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum Hint {
    Put { key: String, hint: ExchangeHint },
    Get { key: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "param", content = "payload")]
pub enum VerifiedData {
    Put { id: String, data: Value },
    Get { id: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(tag = "type", content = "payload")]
pub enum Param {
    Identity(Identity),
    Issuer(Issuer),
    Hint(Hint),
    VerifiedData(VerifiedData),
}

impl TryFrom<Value> for Param {
    type Error = CommonError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(|err| CommonError::JSONError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::json;

    #[test]
    fn test_build_identity_json_str() {
        let param = Param::Identity(Identity::Get {
            name: String::from("alice"),
        });
        let try_json = serde_json::to_string(&param);
        assert!(!try_json.is_err());

        let expected =
            r#"{"type":"Identity","payload":{"param":"Get","payload":{"name":"alice"}}}"#;
        assert_eq!(expected, try_json.unwrap())
    }

    #[test]
    fn test_unit_param_from_value() {
        let value = json!({"type": "Issuer", "payload": {"param": "List"}});
        let param = Param::try_from(value);
        assert!(!param.is_err());
        assert!(matches!(param.unwrap(), Param::Issuer(Issuer::List)))
    }

    #[test]
    fn test_invalid_param() {
        let value = json!({"type": "Identity", "payload": {"param": "Delete"}});
        let param = Param::try_from(value);
        assert!(matches!(param.unwrap_err(), CommonError::JSONError(_)))
    }
}
