//! Common types used throughout starload
//!
//! This module contains the in-memory table type and the small enums
//! shared between the configuration, the processor and the connector.

use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Table Role
// ============================================================================

/// Position of a table in the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    /// Measured records referencing dimensions; receives a surrogate key
    Fact,
    /// Descriptive attributes referenced by the fact table
    #[default]
    Dimension,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Fact => write!(f, "fact"),
            TableRole::Dimension => write!(f, "dimension"),
        }
    }
}

// ============================================================================
// Write Mode
// ============================================================================

/// How a table is written to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Drop and recreate the destination table
    #[default]
    Overwrite,
    /// Insert into the existing table, creating it when missing
    Append,
    /// Refuse to write when the destination table already exists
    #[serde(alias = "fail_if_exists")]
    Fail,
}

impl WriteMode {
    /// The `create_table` behaviour this mode relies on
    pub fn if_exists(self) -> IfExists {
        match self {
            WriteMode::Overwrite => IfExists::Replace,
            WriteMode::Append => IfExists::Skip,
            WriteMode::Fail => IfExists::Error,
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "overwrite"),
            WriteMode::Append => write!(f, "append"),
            WriteMode::Fail => write!(f, "fail"),
        }
    }
}

// ============================================================================
// Table Creation
// ============================================================================

/// What `create_table` does when the table already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    /// Keep the existing table (`CREATE TABLE IF NOT EXISTS`)
    #[default]
    Skip,
    /// Drop the existing table first
    Replace,
    /// Let the server reject the statement
    Error,
}

/// How rows are shipped to the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMethod {
    /// Batched multi-row INSERT statements
    #[default]
    Insert,
    /// One `COPY ... FROM STDIN` stream per table
    Copy,
}

/// A column definition used in `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name (an unquoted-safe identifier)
    pub name: String,
    /// SQL type plus any constraints, e.g. `VARCHAR PRIMARY KEY`
    pub sql_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

// ============================================================================
// In-memory Tables
// ============================================================================

/// A dataset held in memory between reading and writing
#[derive(Debug, Clone)]
pub struct Table {
    /// Destination table name
    pub name: String,
    /// Fact or dimension
    pub role: TableRole,
    /// File the table was read from
    pub source: PathBuf,
    /// Column data
    pub batch: RecordBatch,
}

impl Table {
    pub fn new(
        name: impl Into<String>,
        role: TableRole,
        source: impl Into<PathBuf>,
        batch: RecordBatch,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            source: source.into(),
            batch,
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Replace the data, keeping the metadata
    #[must_use]
    pub fn with_batch(self, batch: RecordBatch) -> Self {
        Self { batch, ..self }
    }
}

/// Outcome of writing one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Destination table
    pub table: String,
    /// Rows sent to the database
    pub rows: u64,
    /// Mode the table was written with
    pub mode: WriteMode,
}
