use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

pub const CONTEXT_DID_V1: &str = "https://w3id.org/did/v1";
pub const KEY_TYPE_ED25519: &str = "Ed25519VerificationKey2018";
pub const AUTH_TYPE_ED25519: &str = "Ed25519SignatureAuthentication2018";
pub const SERVICE_TYPE_INDY_AGENT: &str = "IndyAgent";

/// `DIDDocError` contains all possible errors when building or validating a `DID Doc`
#[derive(Debug, PartialEq, Error, Clone)]
pub enum DIDDocError {
    #[error("missing did")]
    MissingDID,

    #[error("missing public key")]
    MissingPublicKey,

    #[error("unresolved authentication reference: {0}")]
    UnresolvedAuthentication(String),
}

/// `PublicKey` is a single verification key published by the `DID` owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PublicKey {
    pub id: String,

    #[serde(rename = "type")]
    pub key_type: String,

    pub controller: String,

    #[serde(rename = "publicKeyBase58")]
    pub value: String,
}

impl PublicKey {
    pub fn new(id: String, controller: String, value: String) -> Self {
        Self {
            id,
            key_type: KEY_TYPE_ED25519.to_string(),
            controller,
            value,
        }
    }
}

/// `Authentication` is a reference to one of the [`PublicKey`] `id` in the same document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Authentication {
    #[serde(rename = "type")]
    pub auth_type: String,

    #[serde(rename = "publicKey")]
    pub public_key: String,
}

impl Authentication {
    pub fn new(public_key: String) -> Self {
        Self {
            auth_type: AUTH_TYPE_ED25519.to_string(),
            public_key,
        }
    }
}

/// `Service` is the `DIDComm` service endpoint of the `DID` owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type")]
    pub service_type: String,

    #[serde(default)]
    pub priority: u32,

    #[serde(rename = "recipientKeys", default)]
    pub recipient_keys: Vec<String>,

    #[serde(rename = "routingKeys", default)]
    pub routing_keys: Vec<String>,

    #[serde(rename = "serviceEndpoint")]
    pub endpoint: String,
}

impl Service {
    pub fn new(did: &str, recipient_keys: Vec<String>, endpoint: String) -> Self {
        Self {
            id: format!("{};indy", did),
            service_type: SERVICE_TYPE_INDY_AGENT.to_string(),
            priority: 0,
            recipient_keys,
            routing_keys: Vec::new(),
            endpoint,
        }
    }
}
