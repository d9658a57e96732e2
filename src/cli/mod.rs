//! CLI module - argument parsing, interactive prompts and command runners

pub mod args;
pub mod dashboard;
mod prompts;

pub use args::{Cli, Commands, OutputFormat, QueryArgs};
pub use dashboard::{run_pricing, run_shipments, run_snapshot};
pub use prompts::*;
