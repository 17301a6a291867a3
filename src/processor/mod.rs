//! Data processor
//!
//! Reads the configured CSV files, reshapes them into star-schema tables and
//! writes them through a [`DatabaseConnector`].
//!
//! # Overview
//!
//! ```text
//! read_tables ──▶ process_data ──▶ write_to_postgres (per table)
//!   CSV → Arrow     clean_cols        create / check table
//!                   trim_columns      INSERT batches or COPY
//!                   drop_null_rows
//!                   add_surrogate_key (fact)
//! ```

mod clean;
mod transform;

pub use clean::{clean_column_name, clean_column_names, clean_cols};
pub use transform::{add_surrogate_key, drop_null_rows, offset_surrogate_key, trim_columns};

use crate::database::DatabaseConnector;
use crate::decode::{read_csv, CsvOptions};
use crate::error::{Error, Result};
use crate::loader::{PipelineConfig, TableDefinition};
use crate::output::{CopyEncoder, InsertEncoder};
use crate::schema::{check_compatibility, infer_columns};
use crate::types::{ColumnDef, IfExists, LoadMethod, LoadReport, Table, TableRole, WriteMode};

/// Turns the configured input files into loaded database tables
#[derive(Debug, Clone)]
pub struct DataProcessor {
    tables: Vec<TableDefinition>,
    csv: CsvOptions,
    surrogate_key: String,
    load_method: LoadMethod,
    batch_size: usize,
}

impl DataProcessor {
    /// Create a processor for a validated configuration
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            tables: config.tables.clone(),
            csv: config.csv.clone(),
            surrogate_key: config.surrogate_key.clone(),
            load_method: config.load_method,
            batch_size: config.batch_size,
        }
    }

    /// Use a different load method
    #[must_use]
    pub fn with_load_method(mut self, load_method: LoadMethod) -> Self {
        self.load_method = load_method;
        self
    }

    /// Table definitions in load order
    pub fn tables(&self) -> &[TableDefinition] {
        &self.tables
    }

    fn definition(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.table_name() == name)
    }

    // ========================================================================
    // Read
    // ========================================================================

    /// Read every configured file, in configuration order
    pub fn read_tables(&self) -> Result<Vec<Table>> {
        self.tables
            .iter()
            .map(|def| {
                let batch = read_csv(&def.path, &self.csv)?;
                tracing::info!(
                    "Read {} rows, {} columns from {}",
                    batch.num_rows(),
                    batch.num_columns(),
                    def.path.display()
                );
                Ok(Table::new(def.table_name(), def.role, &def.path, batch))
            })
            .collect()
    }

    // ========================================================================
    // Process
    // ========================================================================

    /// Normalize and reshape every table
    pub fn process_data(&self, tables: Vec<Table>) -> Result<Vec<Table>> {
        tables
            .into_iter()
            .map(|table| self.process_table(table))
            .collect()
    }

    /// Normalize column names, trim, drop incomplete rows and, for the fact
    /// table, prepend the surrogate key
    pub fn process_table(&self, table: Table) -> Result<Table> {
        let def = self.definition(&table.name).ok_or_else(|| {
            Error::transform(&table.name, "table is not in the configuration")
        })?;

        let batch = clean_cols(&table.batch)?;
        let mut table = table.with_batch(batch);

        table = trim_columns(table, &def.trim_columns)?;
        table = drop_null_rows(table, &def.key_columns, def.min_non_null)?;
        if table.role == TableRole::Fact {
            table = add_surrogate_key(table, &self.surrogate_key)?;
        }

        tracing::info!(
            "Processed {} ({}): {} rows, {} columns",
            table.name,
            table.role,
            table.num_rows(),
            table.batch.num_columns()
        );
        Ok(table)
    }

    // ========================================================================
    // Write
    // ========================================================================

    /// Column definitions used when `target_name` has to be created
    pub fn table_ddl(&self, table: &Table) -> Vec<ColumnDef> {
        let def = self.definition(&table.name);
        if let Some(def) = def.filter(|d| !d.columns.is_empty()) {
            return def.columns.clone();
        }

        let primary_key = match table.role {
            TableRole::Fact => Some(self.surrogate_key.as_str()),
            TableRole::Dimension => def.and_then(|d| d.primary_key.as_deref()),
        };
        infer_columns(&table.batch.schema(), primary_key)
    }

    /// Write one table to `target_name`
    ///
    /// - `Overwrite` drops and recreates the destination.
    /// - `Append` keeps an existing destination after checking that every
    ///   in-memory column fits into it, or creates it. Fact keys continue
    ///   after the largest key already stored.
    /// - `Fail` refuses to touch an existing destination.
    pub async fn write_to_postgres(
        &self,
        table: &Table,
        connector: &mut DatabaseConnector,
        target_name: &str,
        mode: WriteMode,
    ) -> Result<LoadReport> {
        let columns = self.table_ddl(table);
        let mut continued = None;

        match mode {
            WriteMode::Overwrite => {
                connector
                    .create_table(target_name, &columns, mode.if_exists())
                    .await?;
            }
            WriteMode::Append => {
                if connector.table_exists(target_name).await? {
                    let existing = connector.table_columns(target_name).await?;
                    check_compatibility(target_name, &table.batch.schema(), &existing)?;
                    tracing::info!("Appending to existing table {}", target_name);

                    if table.role == TableRole::Fact {
                        let offset = connector
                            .max_value(target_name, &self.surrogate_key)
                            .await?;
                        tracing::debug!(
                            "Numbering {} keys of {} from {}",
                            self.surrogate_key,
                            target_name,
                            offset + 1
                        );
                        continued = Some(offset_surrogate_key(
                            table.clone(),
                            &self.surrogate_key,
                            offset,
                        )?);
                    }
                } else {
                    connector
                        .create_table(target_name, &columns, IfExists::Skip)
                        .await?;
                }
            }
            WriteMode::Fail => {
                if connector.table_exists(target_name).await? {
                    return Err(Error::write(target_name, "table already exists"));
                }
                connector
                    .create_table(target_name, &columns, mode.if_exists())
                    .await?;
            }
        }

        let table = continued.as_ref().unwrap_or(table);
        let rows = match self.load_method {
            LoadMethod::Insert => self.insert_rows(table, connector, target_name).await?,
            LoadMethod::Copy => copy_rows(table, connector, target_name).await?,
        };

        tracing::info!(
            "Wrote {} rows to {} ({}, {:?})",
            rows,
            target_name,
            mode,
            self.load_method
        );
        Ok(LoadReport {
            table: target_name.to_string(),
            rows,
            mode,
        })
    }

    async fn insert_rows(
        &self,
        table: &Table,
        connector: &DatabaseConnector,
        target_name: &str,
    ) -> Result<u64> {
        let encoder = InsertEncoder::new(target_name, &table.batch, self.batch_size)?;
        tracing::debug!(
            "Inserting {} rows into {} with {} statements of up to {} rows",
            table.num_rows(),
            target_name,
            encoder.statement_count(),
            encoder.rows_per_statement()
        );

        let mut rows = 0;
        for statement in encoder.statements() {
            let params = statement.param_refs();
            let output = connector
                .execute_query(&statement.sql, &params)
                .await
                .map_err(|e| load_error(target_name, e))?;
            rows += output.count();
        }
        Ok(rows)
    }
}

async fn copy_rows(
    table: &Table,
    connector: &DatabaseConnector,
    target_name: &str,
) -> Result<u64> {
    let encoder = CopyEncoder::new(target_name, &table.batch)?;
    let payload = encoder.payload()?;
    tracing::debug!(
        "Copying {} rows ({} bytes) into {}",
        encoder.num_rows(),
        payload.len(),
        target_name
    );

    connector
        .copy_in(&encoder.statement(), payload)
        .await
        .map_err(|e| load_error(target_name, e))
}

/// Database failures while loading rows are reported against the table
fn load_error(table: &str, err: Error) -> Error {
    match err {
        Error::Query { message, .. } => Error::write(table, message),
        other => other,
    }
}
