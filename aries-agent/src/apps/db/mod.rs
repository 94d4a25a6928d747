mod types;
pub use types::{Instruction, OutputOpts};

mod runner;
pub use runner::Runner;

mod builder;
pub use builder::Builder;
