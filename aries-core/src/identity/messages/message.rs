use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use super::decorators::ThreadDecorator;
use super::types::{AgentMessage, MessageError, MessageType};
use super::{BasicMessage, ConnectionRequest, ConnectionResponse, Invitation, TrustPing};

/// `Message` is the closed set of all `DIDComm` messages known by this agent
///
/// The variant is selected by the `@type` property, always written with the legacy
/// `did:sov:...;spec/` prefix. Decoding should always go through [`Message::from_json`]
/// so the `https://didcomm.org/` prefix is accepted too
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", tag = "@type")]
pub enum Message {
    #[serde(rename = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/invitation")]
    Invitation(Invitation),

    #[serde(rename = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/request")]
    ConnectionRequest(ConnectionRequest),

    #[serde(rename = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/response")]
    ConnectionResponse(ConnectionResponse),

    #[serde(rename = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/trust_ping/1.0/ping")]
    TrustPing(TrustPing),

    #[serde(rename = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/basicmessage/1.0/message")]
    BasicMessage(BasicMessage),
}

impl Message {
    /// `from_json` reads the `@type` first, an unknown type is reported before any attempt
    /// to decode the message body
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        let mut value: Value =
            serde_json::from_str(json).map_err(|err| MessageError::JSONError(err.to_string()))?;

        let message_type = {
            let given = value
                .get("@type")
                .and_then(|given| given.as_str())
                .ok_or(MessageError::MissingType)?;

            MessageType::try_from(given)?
        };

        value["@type"] = Value::String(message_type.as_uri().to_string());
        serde_json::from_value(value).map_err(|err| MessageError::JSONError(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, MessageError> {
        serde_json::to_string(&self).map_err(|err| MessageError::JSONError(err.to_string()))
    }

    pub fn get_thread(&self) -> Option<&ThreadDecorator> {
        match self {
            Message::Invitation(_) | Message::ConnectionRequest(_) => None,
            Message::ConnectionResponse(msg) => msg.get_thread(),
            Message::TrustPing(msg) => msg.get_thread(),
            Message::BasicMessage(msg) => msg.get_thread(),
        }
    }
}

impl AgentMessage for Message {
    fn message_type(&self) -> MessageType {
        match self {
            Message::Invitation(msg) => msg.message_type(),
            Message::ConnectionRequest(msg) => msg.message_type(),
            Message::ConnectionResponse(msg) => msg.message_type(),
            Message::TrustPing(msg) => msg.message_type(),
            Message::BasicMessage(msg) => msg.message_type(),
        }
    }

    fn get_id(&self) -> String {
        match self {
            Message::Invitation(msg) => msg.get_id(),
            Message::ConnectionRequest(msg) => msg.get_id(),
            Message::ConnectionResponse(msg) => msg.get_id(),
            Message::TrustPing(msg) => msg.get_id(),
            Message::BasicMessage(msg) => msg.get_id(),
        }
    }
}
