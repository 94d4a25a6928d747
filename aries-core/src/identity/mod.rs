//! `identity` is a domain used to manage the agent identity relationships, following
//! the `Aries` flavour of the `DIDComm` framework
//!
//! The `identity` domain has three sub-domains in it:
//!
//! - `diddoc`
//! - `messages`
//! - `connection`
//!
//! ---
//!
//! The `diddoc` sub-domain contains the `DID Doc` value object published by each peer,
//! which list the public keys, authentication references and the service endpoints.
//! A `DID Doc` must be consistent before it's embedded into any outgoing message
//!
//! ---
//!
//! The `messages` sub-domain contains all supported `DIDComm` messages. Each message is
//! identified by its `@type` URI, and all of them are grouped into a single closed
//! [`messages::Message`] enum, the dispatch layer should only need to match on it
//!
//! ---
//!
//! The `connection` sub-domain maintains the connection protocol between two agents.
//! For an example, `Alice` publish an invitation URL, `Bob` scan it through his agent,
//! his agent will generate a new pairwise `DID` and send a connection request to `Alice`.
//! Once `Alice` respond with her own `DID Doc` signed by her invitation key, `Bob` verifies
//! the signer, send a trust ping and the connection become complete
pub mod connection;
pub mod diddoc;
pub mod messages;
