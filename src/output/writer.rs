//! Statement encoders for loading a table
//!
//! [`InsertEncoder`] turns a batch into multi-row `INSERT` statements with
//! bound parameters; [`CopyEncoder`] turns it into a CSV payload for
//! `COPY ... FROM STDIN`.

use super::columns::{prepare_columns, prepared_batch, EncodedColumn};
use crate::database::quote_ident;
use crate::error::Result;
use crate::schema::SqlType;
use arrow::array::{Array, AsArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{Date32Type, Float64Type, Int64Type, TimestampMicrosecondType};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use tokio_postgres::types::ToSql;

/// PostgreSQL limit on bound parameters in one statement
pub const MAX_PARAMETERS: usize = 65_535;

/// A boxed statement parameter
pub type SqlParam = Box<dyn ToSql + Sync + Send>;

/// One INSERT statement and its parameters
pub struct InsertStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
    pub rows: usize,
}

impl InsertStatement {
    /// Parameters in the form the driver expects
    pub fn param_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

impl std::fmt::Debug for InsertStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertStatement")
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .field("rows", &self.rows)
            .finish()
    }
}

// ============================================================================
// INSERT
// ============================================================================

/// Encodes a batch as batched multi-row INSERT statements
///
/// Placeholders carry an explicit cast (`$1::BIGINT`) so the server applies
/// its assignment casts when the destination column type differs. Columns
/// without any value are written as a literal `NULL`, which any column type
/// accepts.
#[derive(Debug)]
pub struct InsertEncoder {
    table: String,
    columns: Vec<EncodedColumn>,
    num_rows: usize,
    rows_per_statement: usize,
}

impl InsertEncoder {
    /// Prepare `batch` for insertion into `table`, at most `batch_size` rows per statement
    pub fn new(table: &str, batch: &RecordBatch, batch_size: usize) -> Result<Self> {
        let columns = prepare_columns(batch)?;
        let bound = columns.iter().filter(|c| !c.is_all_null()).count().max(1);
        let rows_per_statement = batch_size.min(MAX_PARAMETERS / bound).max(1);

        Ok(Self {
            table: table.to_string(),
            columns,
            num_rows: batch.num_rows(),
            rows_per_statement,
        })
    }

    /// Rows per statement after applying the parameter limit
    pub fn rows_per_statement(&self) -> usize {
        self.rows_per_statement
    }

    /// Number of statements needed for the whole batch
    pub fn statement_count(&self) -> usize {
        self.num_rows.div_ceil(self.rows_per_statement)
    }

    /// Build every statement, in row order
    pub fn statements(&self) -> impl Iterator<Item = InsertStatement> + '_ {
        (0..self.num_rows)
            .step_by(self.rows_per_statement)
            .map(|start| {
                let len = self.rows_per_statement.min(self.num_rows - start);
                self.statement(start, len)
            })
    }

    /// Build the statement covering rows `start..start + len`
    pub fn statement(&self, start: usize, len: usize) -> InsertStatement {
        let column_list = self
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ",
            quote_ident(&self.table)
        );
        let mut params: Vec<SqlParam> = Vec::new();
        let null_columns: Vec<bool> = self.columns.iter().map(EncodedColumn::is_all_null).collect();

        for row in start..start + len {
            if row > start {
                sql.push_str(", ");
            }
            sql.push('(');
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                if null_columns[i] {
                    sql.push_str("NULL");
                } else {
                    params.push(param(column, row));
                    sql.push_str(&format!("${}::{}", params.len(), column.sql_type));
                }
            }
            sql.push(')');
        }

        InsertStatement {
            sql,
            params,
            rows: len,
        }
    }
}

/// The value of one cell as a statement parameter
fn param(column: &EncodedColumn, row: usize) -> SqlParam {
    let array = &column.array;
    let valid = array.is_valid(row);
    match column.sql_type {
        SqlType::BigInt => {
            Box::new(valid.then(|| array.as_primitive::<Int64Type>().value(row)))
        }
        SqlType::DoublePrecision => {
            Box::new(valid.then(|| array.as_primitive::<Float64Type>().value(row)))
        }
        SqlType::Boolean => Box::new(valid.then(|| array.as_boolean().value(row))),
        SqlType::Text => {
            Box::new(valid.then(|| array.as_string::<i32>().value(row).to_string()))
        }
        SqlType::Date => {
            let date: Option<NaiveDate> = array
                .as_primitive::<Date32Type>()
                .value_as_date(row)
                .filter(|_| valid);
            Box::new(date)
        }
        SqlType::Timestamp => {
            let timestamp: Option<NaiveDateTime> = array
                .as_primitive::<TimestampMicrosecondType>()
                .value_as_datetime(row)
                .filter(|_| valid);
            Box::new(timestamp)
        }
    }
}

// ============================================================================
// COPY
// ============================================================================

/// Encodes a batch as a CSV payload for `COPY ... FROM STDIN`
///
/// Nulls are written as empty unquoted fields, which COPY's CSV format reads
/// back as NULL.
#[derive(Debug)]
pub struct CopyEncoder {
    table: String,
    batch: RecordBatch,
}

impl CopyEncoder {
    /// Prepare `batch` for copying into `table`
    pub fn new(table: &str, batch: &RecordBatch) -> Result<Self> {
        let columns = prepare_columns(batch)?;
        Ok(Self {
            table: table.to_string(),
            batch: prepared_batch(&columns)?,
        })
    }

    /// The COPY statement naming every column
    pub fn statement(&self) -> String {
        let column_list = self
            .batch
            .schema()
            .fields()
            .iter()
            .map(|f| quote_ident(f.name()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "COPY {} ({column_list}) FROM STDIN WITH (FORMAT csv)",
            quote_ident(&self.table)
        )
    }

    /// Rows in the payload
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The CSV body, without a header row
    pub fn payload(&self) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().with_header(false).build(Vec::new());
        writer.write(&self.batch)?;
        Ok(writer.into_inner())
    }
}
