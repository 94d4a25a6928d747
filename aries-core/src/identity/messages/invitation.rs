use url::Url;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};
use rst_common::standard::uuid::Uuid;

use super::types::{
    decode_b64url, encode_b64url, AgentMessage, MessageError, MessageType,
};
use super::Message;

/// Query parameter holding the encoded invitation
pub const INVITATION_QUERY_PARAM: &str = "c_i";

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// `Invitation` is the out-of-band message used to bootstrap a new connection
///
/// The first `recipient_keys` entry is the binding key, the connection response sent
/// later by the inviter must be signed by this key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Invitation {
    #[serde(rename = "@id", default = "generate_id")]
    id: String,

    #[serde(default)]
    label: String,

    #[serde(rename = "recipientKeys")]
    recipient_keys: Vec<String>,

    #[serde(rename = "serviceEndpoint", default)]
    service_endpoint: String,

    #[serde(rename = "routingKeys", default)]
    routing_keys: Vec<String>,
}

impl Invitation {
    pub fn new(
        label: String,
        recipient_keys: Vec<String>,
        service_endpoint: String,
        routing_keys: Vec<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            label,
            recipient_keys,
            service_endpoint,
            routing_keys,
        }
    }

    /// `from_url` decodes an invitation from the `c_i` query parameter of an invitation URL
    pub fn from_url(invitation_url: &str) -> Result<Self, MessageError> {
        let url = Url::parse(invitation_url)
            .map_err(|err| MessageError::InvalidInvitation(format!("invalid url: {}", err)))?;

        let encoded = url
            .query_pairs()
            .find(|(key, _)| key == INVITATION_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
            .ok_or(MessageError::InvalidInvitation(format!(
                "missing query parameter: {}",
                INVITATION_QUERY_PARAM
            )))?;

        let bytes = decode_b64url(&encoded)
            .map_err(|err| MessageError::InvalidInvitation(format!("invalid base64: {}", err)))?;

        let json = String::from_utf8(bytes)
            .map_err(|err| MessageError::InvalidInvitation(format!("invalid utf-8: {}", err)))?;

        Self::from_json(&json)
    }

    /// `from_json` decodes and validates the invitation payload, the `@type` is optional but
    /// if it's exists it must be the invitation type
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| MessageError::InvalidInvitation(err.to_string()))?;

        if let Some(given) = value.get("@type") {
            let given_str = given.as_str().unwrap_or_default();
            let message_type = MessageType::try_from(given_str)
                .map_err(|err| MessageError::InvalidInvitation(err.to_string()))?;

            if message_type != MessageType::Invitation {
                return Err(MessageError::InvalidInvitation(format!(
                    "unexpected message type: {}",
                    given_str
                )));
            }
        }

        let invitation: Invitation = serde_json::from_value(value)
            .map_err(|err| MessageError::InvalidInvitation(err.to_string()))?;

        invitation.validate()?;
        Ok(invitation)
    }

    /// `to_url` builds an invitation URL on top of the given base URL
    pub fn to_url(&self, base_url: &str) -> Result<String, MessageError> {
        let mut url = Url::parse(base_url)
            .map_err(|err| MessageError::InvalidInvitation(format!("invalid url: {}", err)))?;

        let json = Message::Invitation(self.to_owned()).to_json()?;
        url.query_pairs_mut()
            .append_pair(INVITATION_QUERY_PARAM, &encode_b64url(json.as_bytes()));

        Ok(url.to_string())
    }

    pub fn validate(&self) -> Result<(), MessageError> {
        match self.recipient_keys.first() {
            Some(key) if !key.is_empty() => Ok(()),
            _ => Err(MessageError::InvalidInvitation(
                "missing recipientKeys".to_string(),
            )),
        }
    }

    pub fn get_label(&self) -> String {
        self.label.to_owned()
    }

    pub fn get_recipient_keys(&self) -> &Vec<String> {
        &self.recipient_keys
    }

    /// `get_binding_key` returns the first recipient key
    pub fn get_binding_key(&self) -> Option<String> {
        self.recipient_keys.first().map(|key| key.to_owned())
    }

    pub fn get_service_endpoint(&self) -> String {
        self.service_endpoint.to_owned()
    }

    pub fn get_routing_keys(&self) -> &Vec<String> {
        &self.routing_keys
    }
}

impl AgentMessage for Invitation {
    fn message_type(&self) -> MessageType {
        MessageType::Invitation
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }
}
