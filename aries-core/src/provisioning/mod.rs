//! `provisioning` maintains the open-or-create lifecycle of the agent's external resources
//!
//! Two resources are covered here, the credential wallet and the optional ledger pool.
//! Each one has its own provider trait and its own status enums, a missing resource is
//! reported through the status (not through an error) so the create step can be taken
//! exactly once before retrying the open
pub mod types;

mod pool;
mod wallet;

pub use pool::open_or_create_pool;
pub use wallet::open_or_create_wallet;
