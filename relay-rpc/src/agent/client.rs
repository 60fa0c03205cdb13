use std::time::Duration;

use reqwest::{Client, Method, Url};

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::{self, json, Value};
use rst_common::standard::uuid::Uuid;
use rst_common::with_logging::log::debug;

use ssi_relay_core::agent::types::{
    AgentAPI, AgentError, ConnectionInvitation, CredentialOffer, CredentialRecord,
    PresentationHandle, PresentationRecord, PresentationRequest,
};

use crate::common::types::CommonError;

const CREDENTIAL_FORMAT: &str = "AnonCreds";
const PRESENTATION_NAME: &str = "proof_of_expertise_and_authorization";
const INVITATION_QUERY_KEY: &str = "_oob";

fn map_transport_error(operation: &str, err: reqwest::Error) -> AgentError {
    if err.is_timeout() {
        return AgentError::Timeout(format!("{}: {}", operation, err));
    }

    AgentError::UpstreamUnavailable(format!("{}: {}", operation, err))
}

fn field_str(value: &Value, pointer: &str) -> Result<String, AgentError> {
    value
        .pointer(pointer)
        .and_then(|field| field.as_str())
        .map(|field| field.to_string())
        .ok_or(AgentError::InvalidResponse(format!(
            "missing field: {}",
            pointer
        )))
}

fn field_contents<T>(value: Value) -> Result<Vec<T>, AgentError>
where
    T: rst_common::standard::serde::de::DeserializeOwned,
{
    let contents = value
        .get("contents")
        .cloned()
        .ok_or(AgentError::InvalidResponse(
            "missing field: contents".to_string(),
        ))?;

    serde_json::from_value(contents).map_err(|err| AgentError::InvalidResponse(err.to_string()))
}

/// `extract_raw_invitation` takes the out-of-band message carried by the invitation url
pub fn extract_raw_invitation(invitation_url: &str) -> Result<String, AgentError> {
    let url = Url::parse(invitation_url)
        .map_err(|err| AgentError::InvalidResponse(format!("invitation url: {}", err)))?;

    url.query_pairs()
        .find(|(key, _)| key == INVITATION_QUERY_KEY)
        .map(|(_, value)| value.into_owned())
        .ok_or(AgentError::InvalidResponse(
            "invitation url has no out-of-band message".to_string(),
        ))
}

/// `AgentClient` talks to one identity agent instance through its REST api
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
    definition_registry_url: String,
}

impl AgentClient {
    pub fn new(
        base_url: String,
        definition_registry_url: String,
        timeout: Duration,
    ) -> Result<Self, CommonError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CommonError::InternalError(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            definition_registry_url: definition_registry_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_definition_uri(&self, credential_definition_id: &str) -> String {
        format!(
            "{}/credential-definition-registry/definitions/{}/definition",
            self.definition_registry_url, credential_definition_id
        )
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AgentError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[agent:send] {} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(payload) = body {
            request = request.json(&payload);
        }

        let response = request
            .send()
            .await
            .map_err(|err| map_transport_error(path, err))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| map_transport_error(path, err))?;

        if !status.is_success() {
            return Err(AgentError::UpstreamUnavailable(format!(
                "{}: status {}: {}",
                path, status, text
            )));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|err| AgentError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl AgentAPI for AgentClient {
    async fn create_did(&self) -> Result<String, AgentError> {
        let body = json!({
            "documentTemplate": {
                "publicKeys": [
                    {"id": "auth-1", "purpose": "authentication", "curve": "secp256k1"}
                ],
                "services": []
            }
        });

        let response = self
            .send(Method::POST, "/did-registrar/dids", Some(body))
            .await?;
        field_str(&response, "/longFormDid")
    }

    async fn publish_did(&self, long_form_did: String) -> Result<String, AgentError> {
        let path = format!("/did-registrar/dids/{}/publications", long_form_did);
        let response = self.send(Method::POST, &path, None).await?;
        field_str(&response, "/scheduledOperation/didRef")
    }

    async fn create_connection(&self, label: String) -> Result<ConnectionInvitation, AgentError> {
        let response = self
            .send(Method::POST, "/connections", Some(json!({"label": label})))
            .await?;

        let invitation_url = field_str(&response, "/invitation/invitationUrl")?;
        let connection_id = field_str(&response, "/connectionId")?;

        Ok(ConnectionInvitation {
            raw_invitation: extract_raw_invitation(&invitation_url)?,
            connection_id,
        })
    }

    async fn accept_connection_invitation(
        &self,
        raw_invitation: String,
    ) -> Result<String, AgentError> {
        let response = self
            .send(
                Method::POST,
                "/connection-invitations",
                Some(json!({"invitation": raw_invitation})),
            )
            .await?;

        field_str(&response, "/connectionId")
    }

    async fn create_credential_offer(&self, offer: CredentialOffer) -> Result<String, AgentError> {
        let body = json!({
            "connectionId": offer.connection_id,
            "credentialFormat": CREDENTIAL_FORMAT,
            "anoncredsVcPropertiesV1": {
                "claims": offer.claims,
                "issuingDID": offer.issuer_did,
                "credentialDefinitionId": offer.credential_definition_id,
                "validityPeriod": offer.validity_period,
            }
        });

        let response = self
            .send(
                Method::POST,
                "/issue-credentials/credential-offers",
                Some(body),
            )
            .await?;
        field_str(&response, "/thid")
    }

    async fn list_credential_records(&self) -> Result<Vec<CredentialRecord>, AgentError> {
        let response = self
            .send(Method::GET, "/issue-credentials/records", None)
            .await?;
        field_contents(response)
    }

    async fn accept_credential_offer(
        &self,
        record_id: String,
        subject_did: String,
    ) -> Result<(), AgentError> {
        let path = format!("/issue-credentials/records/{}/accept-offer", record_id);
        let _ = self
            .send(Method::POST, &path, Some(json!({"subjectId": subject_did})))
            .await?;

        Ok(())
    }

    async fn create_presentation_request(
        &self,
        request: PresentationRequest,
    ) -> Result<PresentationHandle, AgentError> {
        let restrictions = json!([
            {"cred_def_id": self.build_definition_uri(&request.credential_definition_id)}
        ]);

        let body = json!({
            "connectionId": request.connection_id,
            "credentialFormat": CREDENTIAL_FORMAT,
            "anoncredPresentationRequest": {
                "name": PRESENTATION_NAME,
                "version": "1.0",
                "nonce": Uuid::new_v4().as_u128().to_string(),
                "requested_attributes": {
                    "expert_name_proof": {
                        "name": "expert_name",
                        "restrictions": restrictions.clone(),
                    },
                    "evidence_hash_proof": {
                        "name": "evidence_hash",
                        "restrictions": restrictions.clone(),
                    },
                    "subject_did_proof": {
                        "name": "subject_did",
                        "restrictions": restrictions.clone(),
                    }
                },
                "requested_predicates": {
                    "auth_level_proof": {
                        "name": "authorization_level",
                        "p_type": ">=",
                        "p_value": request.level_required,
                        "restrictions": restrictions,
                    }
                }
            },
            "proofs": [],
            "options": null
        });

        let response = self
            .send(Method::POST, "/present-proof/presentations", Some(body))
            .await?;

        Ok(PresentationHandle {
            thid: field_str(&response, "/thid")?,
            presentation_id: field_str(&response, "/presentationId")?,
        })
    }

    async fn list_presentations(&self) -> Result<Vec<PresentationRecord>, AgentError> {
        let response = self
            .send(Method::GET, "/present-proof/presentations", None)
            .await?;
        field_contents(response)
    }

    async fn accept_presentation_request(
        &self,
        presentation_id: String,
        credential_record_id: String,
    ) -> Result<(), AgentError> {
        let body = json!({
            "action": "request-accept",
            "anoncredPresentationRequest": {
                "credentialProofs": [
                    {
                        "credential": credential_record_id,
                        "requestedAttribute": [
                            "expert_name_proof",
                            "evidence_hash_proof",
                            "subject_did_proof"
                        ],
                        "requestedPredicate": ["auth_level_proof"]
                    }
                ]
            }
        });

        let path = format!("/present-proof/presentations/{}", presentation_id);
        let _ = self.send(Method::PATCH, &path, Some(body)).await?;
        Ok(())
    }

    async fn accept_presentation(&self, presentation_id: String) -> Result<(), AgentError> {
        let path = format!("/present-proof/presentations/{}", presentation_id);
        let _ = self
            .send(
                Method::PATCH,
                &path,
                Some(json!({"action": "presentation-accept"})),
            )
            .await?;

        Ok(())
    }

    async fn get_verified_data(&self, presentation_id: String) -> Result<Value, AgentError> {
        let path = format!("/present-proof/presentations/{}", presentation_id);
        let response = self.send(Method::GET, &path, None).await?;

        response
            .get("data")
            .cloned()
            .ok_or(AgentError::InvalidResponse(
                "missing field: data".to_string(),
            ))
    }
}
