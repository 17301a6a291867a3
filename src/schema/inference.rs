//! Table DDL inference and destination schema checks

use super::types::SqlType;
use crate::error::{Error, Result};
use crate::types::ColumnDef;
use arrow::datatypes::Schema;
use std::collections::HashMap;

/// Derive `CREATE TABLE` column definitions from an Arrow schema
///
/// `primary_key` names the column declared `PRIMARY KEY`; other non-nullable
/// columns get `NOT NULL`.
pub fn infer_columns(schema: &Schema, primary_key: Option<&str>) -> Vec<ColumnDef> {
    schema
        .fields()
        .iter()
        .map(|field| {
            let sql_type = SqlType::from_arrow(field.data_type());
            let constraint = if primary_key == Some(field.name().as_str()) {
                " PRIMARY KEY"
            } else if field.is_nullable() {
                ""
            } else {
                " NOT NULL"
            };
            ColumnDef::new(field.name(), format!("{sql_type}{constraint}"))
        })
        .collect()
}

/// Check that every in-memory column exists in the destination with an
/// assignable type
///
/// `existing` holds `(column_name, data_type)` pairs as reported by
/// `information_schema.columns`. Extra destination columns are fine.
pub fn check_compatibility(
    table: &str,
    schema: &Schema,
    existing: &[(String, String)],
) -> Result<()> {
    let destination: HashMap<&str, &str> = existing
        .iter()
        .map(|(name, ty)| (name.as_str(), ty.as_str()))
        .collect();

    let mut problems = Vec::new();
    for field in schema.fields() {
        let sql_type = SqlType::from_arrow(field.data_type());
        match destination.get(field.name().as_str()) {
            None => problems.push(format!("column '{}' missing in destination", field.name())),
            Some(column_type) if !sql_type.assignable_to(column_type) => problems.push(format!(
                "column '{}' is {column_type} in destination but {sql_type} in memory",
                field.name()
            )),
            Some(_) => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::write(
            table,
            format!("schema mismatch: {}", problems.join("; ")),
        ))
    }
}
