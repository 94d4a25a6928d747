use std::collections::BTreeMap;

use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::identity::diddoc::DIDDoc;
use crate::identity::messages::Invitation;

use super::types::{
    ConnectionEntityAccessor, ConnectionError, Endpoint, Role, State, TAG_INVITATION_KEY,
};

/// `ConnectionRecord` is the persisted state of a single connection from our side
///
/// The identity properties are written only once. Our own identity is bound when the record
/// moves to [`State::Requested`] and the peer identity is bound when it moves to
/// [`State::Responded`], the transition methods are the only way to mutate them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionRecord {
    id: String,
    role: Role,
    label: String,
    state: State,
    auto_accept: bool,
    invitation: Invitation,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    did: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    verkey: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    did_doc: Option<DIDDoc>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    their_did: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    their_did_doc: Option<DIDDoc>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    thread_id: Option<String>,

    #[serde(default)]
    tags: BTreeMap<String, Value>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// `new` creates a record for a received invitation, the record always starts as an
    /// [`Role::Invitee`] in [`State::Invited`] state
    pub fn new(invitation: Invitation, label: String, auto_accept: bool) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(
            TAG_INVITATION_KEY.to_string(),
            Value::Bool(invitation.get_binding_key().is_some()),
        );

        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Invitee,
            label,
            state: State::Invited,
            auto_accept,
            invitation,
            did: None,
            verkey: None,
            did_doc: None,
            their_did: None,
            their_did_doc: None,
            thread_id: None,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// `bind_own_identity` sets our pairwise identity and move to [`State::Requested`]
    pub fn bind_own_identity(
        &mut self,
        did: String,
        verkey: String,
        did_doc: DIDDoc,
    ) -> Result<(), ConnectionError> {
        self.check_transition(State::Requested)?;
        if self.did.is_some() {
            return Err(self.invalid_transition(State::Requested));
        }

        did_doc
            .validate()
            .map_err(|err| ConnectionError::InvalidDIDDoc(err.to_string()))?;

        self.did = Some(did);
        self.verkey = Some(verkey);
        self.did_doc = Some(did_doc);
        self.update_state(State::Requested);
        Ok(())
    }

    /// `bind_peer_identity` sets the peer identity received from a verified response and
    /// move to [`State::Responded`]
    pub fn bind_peer_identity(
        &mut self,
        their_did: String,
        their_did_doc: DIDDoc,
        thread_id: String,
    ) -> Result<(), ConnectionError> {
        self.check_transition(State::Responded)?;
        if self.their_did.is_some() {
            return Err(self.invalid_transition(State::Responded));
        }

        their_did_doc
            .validate()
            .map_err(|err| ConnectionError::InvalidDIDDoc(err.to_string()))?;

        self.their_did = Some(their_did);
        self.their_did_doc = Some(their_did_doc);
        self.thread_id = Some(thread_id);
        self.update_state(State::Responded);
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), ConnectionError> {
        self.check_transition(State::Complete)?;
        self.update_state(State::Complete);
        Ok(())
    }

    /// `get_endpoint` resolves where to send the next message, the peer's document
    /// service is preferred once known, fallback to the invitation
    pub fn get_endpoint(&self) -> Endpoint {
        let service = self
            .their_did_doc
            .as_ref()
            .and_then(|doc| doc.get_service());

        match service {
            Some(svc) => Endpoint {
                service_endpoint: svc.endpoint.to_owned(),
                recipient_keys: svc.recipient_keys.to_owned(),
                routing_keys: svc.routing_keys.to_owned(),
            },
            None => Endpoint {
                service_endpoint: self.invitation.get_service_endpoint(),
                recipient_keys: self.invitation.get_recipient_keys().to_owned(),
                routing_keys: self.invitation.get_routing_keys().to_owned(),
            },
        }
    }

    fn check_transition(&self, to: State) -> Result<(), ConnectionError> {
        if !self.state.can_transition_to(to) {
            return Err(self.invalid_transition(to));
        }

        Ok(())
    }

    fn invalid_transition(&self, to: State) -> ConnectionError {
        ConnectionError::InvalidStateTransition {
            record_id: self.id.to_owned(),
            from: self.state,
            to,
        }
    }

    fn update_state(&mut self, state: State) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}

impl ConnectionEntityAccessor for ConnectionRecord {
    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_role(&self) -> Role {
        self.role
    }

    fn get_label(&self) -> String {
        self.label.to_owned()
    }

    fn get_state(&self) -> State {
        self.state
    }

    fn get_auto_accept(&self) -> bool {
        self.auto_accept
    }

    fn get_invitation(&self) -> Invitation {
        self.invitation.to_owned()
    }

    fn get_did(&self) -> Option<String> {
        self.did.to_owned()
    }

    fn get_verkey(&self) -> Option<String> {
        self.verkey.to_owned()
    }

    fn get_did_doc(&self) -> Option<DIDDoc> {
        self.did_doc.to_owned()
    }

    fn get_their_did(&self) -> Option<String> {
        self.their_did.to_owned()
    }

    fn get_their_did_doc(&self) -> Option<DIDDoc> {
        self.their_did_doc.to_owned()
    }

    fn get_thread_id(&self) -> Option<String> {
        self.thread_id.to_owned()
    }

    fn get_tags(&self) -> BTreeMap<String, Value> {
        self.tags.to_owned()
    }

    fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ToJSON for ConnectionRecord {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

impl TryInto<Vec<u8>> for ConnectionRecord {
    type Error = ConnectionError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| ConnectionError::JSONError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for ConnectionRecord {
    type Error = ConnectionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice(&bytes).map_err(|err| ConnectionError::JSONError(err.to_string()))
    }
}
