// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # starload
//!
//! Loads the World Bank Wealth Accounts CSV exports into a PostgreSQL star
//! schema: one fact table (`account_data`) and two dimensions
//! (`account_country`, `account_series`).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starload::{load_config, DataProcessor, DatabaseConnector, Result};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = load_config("config/wealth.example.yaml")?;
//!     let processor = DataProcessor::new(&config);
//!
//!     let tables = processor.process_data(processor.read_tables()?)?;
//!
//!     let mut connector = DatabaseConnector::connect(&config.database).await?;
//!     connector.switch_database(&config.database.dbname).await?;
//!     for (def, table) in processor.tables().iter().zip(&tables) {
//!         processor
//!             .write_to_postgres(table, &mut connector, &table.name, def.mode)
//!             .await?;
//!     }
//!     connector.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────┐   ┌───────────────────┐
//! │    decode    │──▶│         processor         │──▶│      output       │
//! │ CSV → Arrow  │   │ clean · trim · drop · key │   │ INSERT / COPY     │
//! └──────────────┘   └───────────────────────────┘   └─────────┬─────────┘
//!        ▲                        │ schema (DDL)               │
//! ┌──────┴───────┐                ▼                            ▼
//! │    loader    │        ┌──────────────────────────────────────────┐
//! │ YAML config  │        │ database: DatabaseConnector (PostgreSQL) │
//! └──────────────┘        └──────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Template interpolation
pub mod template;

/// YAML configuration loader
pub mod loader;

/// CSV decoding into Arrow
pub mod decode;

/// Arrow ↔ PostgreSQL type mapping
pub mod schema;

/// Row encoding for INSERT and COPY
pub mod output;

/// Column cleaning, row filtering and loading
pub mod processor;

/// PostgreSQL connectivity
pub mod database;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use database::{DatabaseConnector, QueryOutput};
pub use loader::{load_config, load_config_from_str, PipelineConfig, TableDefinition};
pub use processor::DataProcessor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
