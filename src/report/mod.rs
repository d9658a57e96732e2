//! Report module - terminal tables and JSON export of dashboard views

pub mod export;
pub mod summary;
pub mod table;

pub use export::*;
pub use summary::*;
pub use table::*;
