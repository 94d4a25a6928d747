//! `messages` is a sub-domain of `identity` which contains all supported `DIDComm` messages
//!
//! Supported messages:
//!
//! - [`Invitation`], the out-of-band connection invitation
//! - [`ConnectionRequest`] and [`ConnectionResponse`]
//! - [`TrustPing`]
//! - [`BasicMessage`]
//!
//! All of them are grouped into the [`Message`] enum tagged by their `@type`
pub mod decorators;
pub mod types;

mod invitation;
pub use invitation::{Invitation, INVITATION_QUERY_PARAM};

mod connection;
pub use connection::{Connection, ConnectionRequest, ConnectionResponse};

mod trust_ping;
pub use trust_ping::TrustPing;

mod basic;
pub use basic::BasicMessage;

mod message;
pub use message::Message;

pub use decorators::{SignatureDecorator, ThreadDecorator};
