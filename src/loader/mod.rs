//! Configuration loader
//!
//! Parse load configurations from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `PipelineConfig` - database settings, CSV options and the table list
//! - `TableDefinition` - one input file and its destination table
//! - YAML parsing with `{{ env.NAME }}` interpolation and validation

mod parser;
mod types;

pub use parser::{load_config, load_config_from_str, load_config_with_context, validate_config};
pub use types::{DatabaseConfig, PipelineConfig, TableDefinition};

#[cfg(test)]
mod tests;
