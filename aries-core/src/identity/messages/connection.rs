use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::uuid::Uuid;

use crate::identity::diddoc::DIDDoc;

use super::decorators::{SignatureDecorator, ThreadDecorator};
use super::types::{AgentMessage, MessageError, MessageType};

/// `Connection` is the pairwise identity exchanged through request and response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Connection {
    #[serde(rename = "DID")]
    pub did: String,

    #[serde(rename = "DIDDoc")]
    pub did_doc: DIDDoc,
}

impl Connection {
    pub fn new(did: String, did_doc: DIDDoc) -> Self {
        Self { did, did_doc }
    }
}

/// `ConnectionRequest` is sent by the invitee to the inviter's endpoint
///
/// The `@id` is the invitee's own connection record id, the inviter will use it
/// as the `~thread.thid` of its response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionRequest {
    #[serde(rename = "@id")]
    id: String,

    label: String,
    connection: Connection,
}

impl ConnectionRequest {
    pub fn new(id: String, label: String, connection: Connection) -> Self {
        Self {
            id,
            label,
            connection,
        }
    }

    pub fn get_label(&self) -> String {
        self.label.to_owned()
    }

    pub fn get_connection(&self) -> &Connection {
        &self.connection
    }
}

impl AgentMessage for ConnectionRequest {
    fn message_type(&self) -> MessageType {
        MessageType::ConnectionRequest
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }
}

/// `ConnectionResponse` is sent back by the inviter, its [`Connection`] is wrapped
/// inside the `connection~sig` decorator signed by the inviter's invitation key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionResponse {
    #[serde(rename = "@id")]
    id: String,

    #[serde(rename = "~thread", skip_serializing_if = "Option::is_none", default)]
    thread: Option<ThreadDecorator>,

    #[serde(rename = "connection~sig")]
    connection_sig: SignatureDecorator,
}

impl ConnectionResponse {
    pub fn new(thread: ThreadDecorator, connection_sig: SignatureDecorator) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread: Some(thread),
            connection_sig,
        }
    }

    pub fn get_thread(&self) -> Option<&ThreadDecorator> {
        self.thread.as_ref()
    }

    /// `get_thid` fails when the response is not threaded, a response is always a reply
    pub fn get_thid(&self) -> Result<String, MessageError> {
        self.thread
            .as_ref()
            .ok_or(MessageError::MissingThread)
            .and_then(|thread| thread.get_thid())
    }

    pub fn get_signature(&self) -> &SignatureDecorator {
        &self.connection_sig
    }

    pub fn get_signer(&self) -> String {
        self.connection_sig.get_signer()
    }

    pub fn get_connection(&self) -> Result<Connection, MessageError> {
        self.connection_sig.unpack()
    }
}

impl AgentMessage for ConnectionResponse {
    fn message_type(&self) -> MessageType {
        MessageType::ConnectionResponse
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }
}
