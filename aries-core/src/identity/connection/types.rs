use std::collections::BTreeMap;
use std::fmt::Debug;

use derive_more::Display;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use rstdev_domain::entity::ToJSON;

use crate::identity::diddoc::DIDDoc;
use crate::identity::messages::types::MessageType;
use crate::identity::messages::{ConnectionResponse, Invitation, Message};

/// Record type discriminator used by the record storage
pub const RECORD_TYPE_CONNECTION: &str = "ConnectionRecord";

/// Record tag telling whether the invitation contains a binding key
pub const TAG_INVITATION_KEY: &str = "invitation_key";

/// ConnectionError is a base error types for the `Connection` domain
///
/// Each protocol level error carries enough context (record id, thread id, failing step)
/// to let an operator retry the step or inspect the stored record
#[derive(Debug, PartialEq, Error, Clone)]
pub enum ConnectionError {
    #[error("invalid invitation: {0}")]
    InvalidInvitation(String),

    #[error("untrusted signer: record: {record_id}, thread: {thread_id}, signer: {signer}")]
    UntrustedSigner {
        record_id: String,
        thread_id: String,
        signer: String,
    },

    #[error("invalid signature: record: {record_id}, signer: {signer}")]
    InvalidSignature { record_id: String, signer: String },

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("record already exists: {0}")]
    RecordExists(String),

    #[error("transport error: record: {record_id}, step: {step}, reason: {reason}")]
    TransportError {
        record_id: String,
        step: String,
        reason: String,
    },

    #[error("invalid state transition: record: {record_id}, from: {from}, to: {to}")]
    InvalidStateTransition {
        record_id: String,
        from: State,
        to: State,
    },

    #[error("wallet error: {0}")]
    WalletError(String),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("invalid did doc: {0}")]
    InvalidDIDDoc(String),

    #[error("message error: {0}")]
    MessageError(String),

    #[error("missing thread id")]
    MissingThread,

    #[error("json error: {0}")]
    JSONError(String),
}

/// State represent the connection protocol states from the invitee's perspective
///
/// The states are linear and ordered, a record can only move forward one step at a time:
/// [`State::Invited`] -> [`State::Requested`] -> [`State::Responded`] -> [`State::Complete`]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[serde(crate = "self::serde", rename_all = "lowercase")]
pub enum State {
    #[display("invited")]
    Invited,

    #[display("requested")]
    Requested,

    #[display("responded")]
    Responded,

    #[display("complete")]
    Complete,
}

impl State {
    /// `next` returns the only state allowed after the current one
    pub fn next(&self) -> Option<State> {
        match self {
            State::Invited => Some(State::Requested),
            State::Requested => Some(State::Responded),
            State::Responded => Some(State::Complete),
            State::Complete => None,
        }
    }

    pub fn can_transition_to(&self, to: State) -> bool {
        self.next() == Some(to)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(crate = "self::serde", rename_all = "lowercase")]
pub enum Role {
    #[display("inviter")]
    Inviter,

    #[display("invitee")]
    Invitee,
}

/// `Endpoint` is the peer's transport destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Endpoint {
    pub service_endpoint: String,
    pub recipient_keys: Vec<String>,
    pub routing_keys: Vec<String>,
}

/// `ConnectionEntityAccessor` it's a special trait used to access main connection record
/// property fields.
///
/// This trait will be useful from the outside of this crate to access those fields because
/// we need to protect the properties from direct manipulation, all of the mutations must go
/// through the record state transitions
pub trait ConnectionEntityAccessor:
    Clone + Debug + ToJSON + TryInto<Vec<u8>> + TryFrom<Vec<u8>> + Send + Sync
{
    fn get_id(&self) -> String;
    fn get_role(&self) -> Role;
    fn get_label(&self) -> String;
    fn get_state(&self) -> State;
    fn get_auto_accept(&self) -> bool;
    fn get_invitation(&self) -> Invitation;
    fn get_did(&self) -> Option<String>;
    fn get_verkey(&self) -> Option<String>;
    fn get_did_doc(&self) -> Option<DIDDoc>;
    fn get_their_did(&self) -> Option<String>;
    fn get_their_did_doc(&self) -> Option<DIDDoc>;
    fn get_thread_id(&self) -> Option<String>;
    fn get_tags(&self) -> BTreeMap<String, Value>;
    fn get_created_at(&self) -> DateTime<Utc>;
    fn get_updated_at(&self) -> DateTime<Utc>;
}

/// ConnectionAPI is main entrypoint to communicate with the `Connection` domain
#[async_trait]
pub trait ConnectionAPI: Clone {
    type EntityAccessor: ConnectionEntityAccessor;

    /// `receive_invitation_url` decodes the `c_i` query parameter into an [`Invitation`],
    /// save a new record in [`State::Invited`] state and, when `auto_accept` is enabled,
    /// continue with [`ConnectionAPI::send_request`]
    ///
    /// Nothing is saved when the invitation is invalid
    async fn receive_invitation_url(
        &self,
        url: String,
        auto_accept: bool,
    ) -> Result<Self::EntityAccessor, ConnectionError>;

    /// `receive_invitation` is the same as [`ConnectionAPI::receive_invitation_url`] for an
    /// already decoded invitation
    async fn receive_invitation(
        &self,
        invitation: Invitation,
        auto_accept: bool,
    ) -> Result<Self::EntityAccessor, ConnectionError>;

    /// `accept_invitation` is the explicit accept used when the invitation was received without
    /// `auto_accept`. When the record already in [`State::Requested`], it will resend the request
    /// using the existing identity
    async fn accept_invitation(&self, id: String) -> Result<Self::EntityAccessor, ConnectionError>;

    /// `create_connection` generates our own pairwise `DID` and `DID Doc` and move the record
    /// to [`State::Requested`]. Any wallet failure leaves the record untouched
    async fn create_connection(
        &self,
        record: Self::EntityAccessor,
    ) -> Result<Self::EntityAccessor, ConnectionError>;

    /// `send_request` sends the connection request to the invitation's endpoint, the request's
    /// `@id` is our own record id
    async fn send_request(
        &self,
        record: Self::EntityAccessor,
    ) -> Result<Self::EntityAccessor, ConnectionError>;

    /// `process_response` handles an incoming [`ConnectionResponse`]
    ///
    /// The response's signer must be the invitation binding key, if it's not the
    /// record will not be changed. A response for a record already responded is
    /// treated as a duplicate and ignored
    async fn process_response(
        &self,
        response: ConnectionResponse,
    ) -> Result<Self::EntityAccessor, ConnectionError>;

    /// `complete_connection` resumes a record left at [`State::Responded`]
    async fn complete_connection(&self, id: String)
        -> Result<Self::EntityAccessor, ConnectionError>;

    async fn retrieve_connection_record(
        &self,
        id: String,
    ) -> Result<Self::EntityAccessor, ConnectionError>;
}

/// `MessageHandler` is the behavior registered into the dispatch layer
#[async_trait]
pub trait MessageHandler {
    fn supported_messages(&self) -> Vec<MessageType>;

    async fn handle(&self, message: Message) -> Result<(), ConnectionError>;
}

/// RepoBuilder is a `Connection Record Repository` abstraction by implementing repository pattern
///
/// `save_record` must not overwrite an existing record, and `update_record` must not
/// create a missing one
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    type EntityAccessor: ConnectionEntityAccessor;

    async fn save_record(&self, record: &Self::EntityAccessor) -> Result<(), ConnectionError>;
    async fn update_record(&self, record: &Self::EntityAccessor) -> Result<(), ConnectionError>;
    async fn get_record(
        &self,
        record_type: String,
        id: String,
    ) -> Result<Self::EntityAccessor, ConnectionError>;
}

/// `WalletBuilder` is the credential store abstraction, it owns all private keys
#[async_trait]
pub trait WalletBuilder: Clone + Sync + Send {
    /// `create_did` generates a new pairwise `DID` and returns it with its verkey
    async fn create_did(&self) -> Result<(String, String), ConnectionError>;

    async fn verify(
        &self,
        verkey: String,
        data: Vec<u8>,
        signature: Vec<u8>,
    ) -> Result<bool, ConnectionError>;
}

/// `TransportBuilder` delivers a message to the given peer endpoint
#[async_trait]
pub trait TransportBuilder: Clone + Sync + Send {
    async fn send(&self, endpoint: Endpoint, message: Message) -> Result<(), ConnectionError>;
}
