use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use rst_common::with_errors::thiserror::{self, Error};

pub const DIDCOMM_PREFIX_LEGACY: &str = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/";
pub const DIDCOMM_PREFIX: &str = "https://didcomm.org/";

pub const TYPE_CONNECTION_INVITATION: &str =
    "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/invitation";
pub const TYPE_CONNECTION_REQUEST: &str =
    "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/request";
pub const TYPE_CONNECTION_RESPONSE: &str =
    "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/response";
pub const TYPE_TRUST_PING: &str = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/trust_ping/1.0/ping";
pub const TYPE_BASIC_MESSAGE: &str =
    "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/basicmessage/1.0/message";

pub const TYPE_SIGNATURE_ED25519: &str =
    "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/signature/1.0/ed25519Sha512_single";

const SUFFIX_CONNECTION_INVITATION: &str = "connections/1.0/invitation";
const SUFFIX_CONNECTION_REQUEST: &str = "connections/1.0/request";
const SUFFIX_CONNECTION_RESPONSE: &str = "connections/1.0/response";
const SUFFIX_TRUST_PING: &str = "trust_ping/1.0/ping";
const SUFFIX_BASIC_MESSAGE: &str = "basicmessage/1.0/message";

/// URL safe alphabet, padding is optional on decode and always written on encode
const URL_SAFE_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// `MessageError` contains all possible errors when encoding or decoding `DIDComm` messages
#[derive(Debug, PartialEq, Error, Clone)]
pub enum MessageError {
    #[error("json error: {0}")]
    JSONError(String),

    #[error("missing message type")]
    MissingType,

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("invalid invitation: {0}")]
    InvalidInvitation(String),

    #[error("invalid signature decorator: {0}")]
    InvalidSignatureDecorator(String),

    #[error("missing thread id")]
    MissingThread,
}

/// `MessageType` is a closed set of all message types supported by this agent
///
/// Each variant maps to a single globally-namespaced `@type` URI, the dispatch layer
/// only need to inspect this value before deserializing the message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Invitation,
    ConnectionRequest,
    ConnectionResponse,
    TrustPing,
    BasicMessage,
}

impl MessageType {
    pub fn as_uri(&self) -> &'static str {
        match self {
            MessageType::Invitation => TYPE_CONNECTION_INVITATION,
            MessageType::ConnectionRequest => TYPE_CONNECTION_REQUEST,
            MessageType::ConnectionResponse => TYPE_CONNECTION_RESPONSE,
            MessageType::TrustPing => TYPE_TRUST_PING,
            MessageType::BasicMessage => TYPE_BASIC_MESSAGE,
        }
    }
}

impl TryFrom<&str> for MessageType {
    type Error = MessageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let suffix = value
            .strip_prefix(DIDCOMM_PREFIX_LEGACY)
            .or_else(|| value.strip_prefix(DIDCOMM_PREFIX))
            .ok_or(MessageError::UnknownType(value.to_string()))?;

        match suffix {
            SUFFIX_CONNECTION_INVITATION => Ok(Self::Invitation),
            SUFFIX_CONNECTION_REQUEST => Ok(Self::ConnectionRequest),
            SUFFIX_CONNECTION_RESPONSE => Ok(Self::ConnectionResponse),
            SUFFIX_TRUST_PING => Ok(Self::TrustPing),
            SUFFIX_BASIC_MESSAGE => Ok(Self::BasicMessage),
            _ => Err(MessageError::UnknownType(value.to_string())),
        }
    }
}

/// `AgentMessage` is a shared behavior of all `DIDComm` messages, each message must be
/// able to tell its own type and its own `@id`
pub trait AgentMessage {
    fn message_type(&self) -> MessageType;
    fn get_id(&self) -> String;
}

pub(crate) fn encode_b64url(input: &[u8]) -> String {
    URL_SAFE_INDIFFERENT.encode(input)
}

pub(crate) fn decode_b64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_INDIFFERENT.decode(input.trim())
}
