//! CLI module
//!
//! Command-line interface for running a load.
//!
//! ```text
//! starload --config wealth.yaml [--verbose] [--dry-run]
//! ```

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::{load, prepare, table_summary, Runner};
