//! `prople-aries-agent` is the host side of the `prople/aries` agent
//!
//! It provides the agent configuration (TOML), the open/close/delete lifecycle of the
//! agent's wallet and ledger pool, and a `RocksDB` implementation of the connection
//! record storage used by the connection protocol
pub mod common;

mod apps;
pub use apps::types::AppError;
pub use apps::{ConnectionRepository, DbBuilder, DbInstruction, DbOutput, DbRunner};

mod config;
pub use config::Config;
pub use config::Parser as ConfigManager;

mod agent;
pub use agent::{Agent, AgentError};
