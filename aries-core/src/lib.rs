//! `prople-aries-core` contains the core business logic of the `prople/aries` agent
//!
//! The crate is split into two domains:
//!
//! - `identity`, which maintains the `DIDComm` connection protocol, its messages and
//!   the `DID Doc` model exchanged between two peers
//! - `provisioning`, which maintains the open-or-create lifecycle of the agent's
//!   external resources (the credential wallet and the optional ledger pool)
//!
//! Every external collaborator (wallet, transport, record storage, ledger) is
//! consumed through a trait, the implementation is provided by the host application
pub mod identity;
pub mod provisioning;
