//! `connection` is a sub-domain of `identity` which maintains the `DIDComm` connection protocol
//! from the invitee's perspective
//!
//! The protocol flow:
//!
//! ```text
//! invitation URL (c_i)
//! ├── decode into an `Invitation`, save a new record (invited)
//! ├── generate our own pairwise DID and DID Doc (requested)
//! ├── send `ConnectionRequest` to the invitation endpoint
//! ...
//! `ConnectionResponse` (threaded to our record id)
//! ├── the signer must be the invitation binding key (recipientKeys[0])
//! ├── the wallet verifies the signature
//! ├── store the peer DID and DID Doc (responded)
//! └── send a threaded `TrustPing` (complete)
//! ```
//!
//! All of the collaborators (record storage, wallet, transport) are injected into the
//! [`usecase::Usecase`] through the traits defined in [`types`]
pub mod types;
pub mod usecase;

mod record;
pub use record::ConnectionRecord;
