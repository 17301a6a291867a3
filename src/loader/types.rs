//! Configuration types for a load run
//!
//! The YAML file maps onto [`PipelineConfig`]. Every section has defaults so a
//! config only needs to state what differs from the Wealth Accounts layout.

use crate::decode::CsvOptions;
use crate::processor::clean_column_name;
use crate::types::{ColumnDef, LoadMethod, TableRole, WriteMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration of one load run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// CSV parsing options shared by all input files
    #[serde(default)]
    pub csv: CsvOptions,

    /// Name of the generated key column on the fact table
    #[serde(default = "default_surrogate_key")]
    pub surrogate_key: String,

    /// How rows are shipped to the database
    #[serde(default)]
    pub load_method: LoadMethod,

    /// Rows per INSERT statement
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Tables in load order (dimensions before the fact table when foreign keys are declared)
    #[serde(default = "default_tables")]
    pub tables: Vec<TableDefinition>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            csv: CsvOptions::default(),
            surrogate_key: default_surrogate_key(),
            load_method: LoadMethod::default(),
            batch_size: default_batch_size(),
            tables: default_tables(),
        }
    }
}

impl PipelineConfig {
    /// The fact table definition, if any
    pub fn fact_table(&self) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.role == TableRole::Fact)
    }

    /// Resolve relative input paths against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for table in &mut self.tables {
            if table.path.is_relative() {
                table.path = base.join(&table.path);
            }
        }
    }
}

fn default_surrogate_key() -> String {
    "id".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_tables() -> Vec<TableDefinition> {
    vec![
        TableDefinition {
            name: Some("account_series".to_string()),
            path: PathBuf::from("datasets/Wealth-AccountSeries.csv"),
            role: TableRole::Dimension,
            primary_key: Some("code".to_string()),
            key_columns: vec!["code".to_string()],
            trim_columns: vec!["code".to_string()],
            ..TableDefinition::default()
        },
        TableDefinition {
            name: Some("account_country".to_string()),
            path: PathBuf::from("datasets/Wealth-AccountsCountry.csv"),
            role: TableRole::Dimension,
            primary_key: Some("code".to_string()),
            key_columns: vec!["code".to_string()],
            trim_columns: vec!["code".to_string()],
            min_non_null: Some(5),
            ..TableDefinition::default()
        },
        TableDefinition {
            name: Some("account_data".to_string()),
            path: PathBuf::from("datasets/Wealth-AccountData.csv"),
            role: TableRole::Fact,
            key_columns: vec!["country_code".to_string(), "series_code".to_string()],
            trim_columns: vec!["country_code".to_string(), "series_code".to_string()],
            ..TableDefinition::default()
        },
    ]
}

// ============================================================================
// Database
// ============================================================================

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the individual fields
    #[serde(default)]
    pub connection_string: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: Option<String>,

    /// Database for the first session (defaults to the connection string's
    /// database, then `postgres`)
    #[serde(default)]
    pub maintenance_db: Option<String>,

    /// Target database the tables are written to
    #[serde(default = "default_dbname")]
    pub dbname: String,

    /// Create the target database when it does not exist
    #[serde(default = "default_true")]
    pub create_database: bool,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: None,
            maintenance_db: None,
            dbname: default_dbname(),
            create_database: true,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_dbname() -> String {
    "wealth".to_string()
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    10
}

// ============================================================================
// Tables
// ============================================================================

/// One input file and how it becomes a database table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Destination table name (defaults to the normalized file stem)
    #[serde(default)]
    pub name: Option<String>,

    /// CSV input path
    pub path: PathBuf,

    #[serde(default)]
    pub role: TableRole,

    /// Rows with a null in any of these (cleaned) columns are dropped
    #[serde(default)]
    pub key_columns: Vec<String>,

    /// String columns whose values are trimmed
    #[serde(default)]
    pub trim_columns: Vec<String>,

    /// Rows with fewer non-null values than this are dropped
    #[serde(default)]
    pub min_non_null: Option<usize>,

    /// Column declared `PRIMARY KEY` in inferred DDL (dimensions)
    #[serde(default)]
    pub primary_key: Option<String>,

    #[serde(default)]
    pub mode: WriteMode,

    /// Explicit DDL; when empty the column types are inferred from the data
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl TableDefinition {
    /// Destination table name
    pub fn table_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        clean_column_name(&stem)
    }
}
