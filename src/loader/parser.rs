//! YAML parser for load configurations
//!
//! Renders `{{ env.NAME }}` references, parses the YAML and validates the
//! result before anything touches the filesystem or the database.

use crate::error::{Error, Result};
use crate::loader::types::PipelineConfig;
use crate::processor::clean_column_name;
use crate::template::{self, TemplateContext};
use crate::types::TableRole;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// PostgreSQL caps bound parameters per statement at 65 535
const MAX_BATCH_SIZE: usize = 65_535;

/// Load a configuration file
///
/// Relative input paths are resolved against the directory holding the file.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let mut config = load_config_with_context(&content, &TemplateContext::from_env())?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Load a configuration from a YAML string, interpolating the process environment
pub fn load_config_from_str(yaml: &str) -> Result<PipelineConfig> {
    load_config_with_context(yaml, &TemplateContext::from_env())
}

/// Load a configuration from a YAML string with an explicit template context
pub fn load_config_with_context(yaml: &str, ctx: &TemplateContext) -> Result<PipelineConfig> {
    let rendered = template::render(yaml, ctx)?;
    let config: PipelineConfig = serde_yaml::from_str(&rendered)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate a configuration
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.tables.is_empty() {
        return Err(Error::config("At least one table must be configured"));
    }

    let facts = config
        .tables
        .iter()
        .filter(|t| t.role == TableRole::Fact)
        .count();
    if facts != 1 {
        return Err(Error::config(format!(
            "Exactly one fact table is required, found {facts}"
        )));
    }

    if config.batch_size == 0 || config.batch_size > MAX_BATCH_SIZE {
        return Err(Error::config(format!(
            "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
            config.batch_size
        )));
    }

    check_identifier("surrogate_key", &config.surrogate_key)?;

    if config.database.dbname.is_empty() {
        return Err(Error::config("database.dbname cannot be empty"));
    }

    let mut names = HashSet::new();
    for table in &config.tables {
        let name = table.table_name();
        check_identifier("table name", &name)?;
        if !names.insert(name.clone()) {
            return Err(Error::config(format!("Duplicate table name: {name}")));
        }

        for column in table.key_columns.iter().chain(&table.trim_columns) {
            check_identifier(&format!("column of table '{name}'"), column)?;
        }
        if let Some(pk) = &table.primary_key {
            check_identifier(&format!("primary key of table '{name}'"), pk)?;
        }
        for column in &table.columns {
            check_identifier(&format!("column of table '{name}'"), &column.name)?;
            if column.sql_type.trim().is_empty() {
                return Err(Error::config(format!(
                    "Column '{}' of table '{name}' has no sql_type",
                    column.name
                )));
            }
        }
    }

    Ok(())
}

/// Column and table names refer to normalized identifiers
fn check_identifier(what: &str, name: &str) -> Result<()> {
    if name.is_empty() || clean_column_name(name) != name {
        return Err(Error::config(format!(
            "Invalid {what} '{name}': expected a normalized identifier such as '{}'",
            clean_column_name(name)
        )));
    }
    Ok(())
}
