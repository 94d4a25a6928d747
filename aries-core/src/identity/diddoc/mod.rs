//! `diddoc` is a sub-domain of `identity` which maintains the `DID Doc` value object
//!
//! This domain only provides the data structure and its construction, there is no
//! resolution logic here. The default document built by this domain contains:
//!
//! - One `publicKey` entry, the verification key of the `DID`
//! - One `authentication` entry, referencing the public key
//! - An optional `IndyAgent` service, used when the agent has its own inbound endpoint
pub mod types;

mod doc;
pub use doc::DIDDoc;
