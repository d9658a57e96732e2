//! Terminal helpers shared by the command-line front end

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
