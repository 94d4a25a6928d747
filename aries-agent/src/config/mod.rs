mod agent;
pub use agent::AgentSettings;

mod ledger;
pub use ledger::Ledger;

mod storage;
pub use storage::ConnectionStorage;

mod config;
pub use config::Config;

mod parser;
pub use parser::Parser;
