pub mod types;

mod db;
pub use db::{
    Builder as DbBuilder, Instruction as DbInstruction, OutputOpts as DbOutput, Runner as DbRunner,
};

mod connection;
pub use connection::ConnectionRepository;
