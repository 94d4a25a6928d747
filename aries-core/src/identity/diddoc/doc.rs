use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::{Authentication, DIDDocError, PublicKey, Service, CONTEXT_DID_V1};

fn default_context() -> String {
    CONTEXT_DID_V1.to_string()
}

/// `DIDDoc` is the published identity of a single party in a connection
///
/// The document used at this protocol is the legacy `Aries` format (`publicKey`,
/// `authentication` and `service`), all of its properties are private and can only
/// be read through its getters, the only way to build it is through [`DIDDoc::new_default`]
/// or by deserializing a peer's document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct DIDDoc {
    #[serde(rename = "@context", default = "default_context")]
    context: String,

    id: String,

    #[serde(rename = "publicKey", default)]
    public_key: Vec<PublicKey>,

    #[serde(default)]
    authentication: Vec<Authentication>,

    #[serde(default)]
    service: Vec<Service>,
}

impl DIDDoc {
    /// `new_default` build a minimal document from a `DID` and its verification key
    ///
    /// The `endpoint` is optional, a mobile agent usually doesn't have any inbound endpoint,
    /// if it's not provided the document will not contain any service
    pub fn new_default(did: String, verkey: String, endpoint: Option<String>) -> Self {
        let key_id = format!("{}#1", did);
        let public_key = PublicKey::new(key_id.clone(), did.clone(), verkey.clone());
        let authentication = Authentication::new(key_id);

        let service = endpoint
            .map(|endpoint| vec![Service::new(&did, vec![verkey], endpoint)])
            .unwrap_or_default();

        Self {
            context: default_context(),
            id: did,
            public_key: vec![public_key],
            authentication: vec![authentication],
            service,
        }
    }

    /// `validate` makes sure the document is internally consistent, every `authentication`
    /// reference must resolve to a `publicKey` of the same document
    pub fn validate(&self) -> Result<(), DIDDocError> {
        if self.id.is_empty() {
            return Err(DIDDocError::MissingDID);
        }

        if self.public_key.is_empty() {
            return Err(DIDDocError::MissingPublicKey);
        }

        for auth in self.authentication.iter() {
            if self.get_public_key(&auth.public_key).is_none() {
                return Err(DIDDocError::UnresolvedAuthentication(
                    auth.public_key.to_owned(),
                ));
            }
        }

        Ok(())
    }

    pub fn get_id(&self) -> String {
        self.id.to_owned()
    }

    pub fn get_public_keys(&self) -> &Vec<PublicKey> {
        &self.public_key
    }

    pub fn get_public_key(&self, key_id: &str) -> Option<&PublicKey> {
        self.public_key.iter().find(|key| key.id == key_id)
    }

    pub fn get_authentications(&self) -> &Vec<Authentication> {
        &self.authentication
    }

    pub fn get_services(&self) -> &Vec<Service> {
        &self.service
    }

    /// `get_service` returns the service with the lowest priority value
    pub fn get_service(&self) -> Option<&Service> {
        self.service.iter().min_by_key(|svc| svc.priority)
    }

    /// `get_verkey` returns the key value referenced by the first `authentication` entry,
    /// fallback to the first `publicKey` when there is no authentication at all
    pub fn get_verkey(&self) -> Option<String> {
        self.authentication
            .first()
            .and_then(|auth| self.get_public_key(&auth.public_key))
            .or(self.public_key.first())
            .map(|key| key.value.to_owned())
    }
}

impl ToJSON for DIDDoc {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}
