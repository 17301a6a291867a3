//! Row and column transforms applied after reading
//!
//! All functions take and return a [`Table`] so errors can name the source
//! file or destination table.

use crate::error::{Error, Result};
use crate::types::Table;
use arrow::array::{ArrayRef, AsArray, BooleanArray, Int64Array, StringArray};
use arrow::buffer::NullBuffer;
use arrow::compute::kernels::boolean::{and, is_not_null};
use arrow::compute::kernels::filter::filter_record_batch;
use arrow::datatypes::{DataType, Field, Int64Type, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Position of a column, or a FileFormat error listing what the file has
fn column_index(table: &Table, column: &str) -> Result<usize> {
    table.batch.schema().index_of(column).map_err(|_| {
        Error::file_format(
            &table.source,
            format!(
                "expected column '{column}' not found; columns are: {}",
                table.column_names().join(", ")
            ),
        )
    })
}

/// Trim surrounding whitespace in the given string columns
///
/// Values that are empty after trimming become null. Columns that were not
/// inferred as text are left alone.
pub fn trim_columns(table: Table, columns: &[String]) -> Result<Table> {
    if columns.is_empty() {
        return Ok(table);
    }

    let mut arrays: Vec<ArrayRef> = table.batch.columns().to_vec();
    for column in columns {
        let idx = column_index(&table, column)?;
        let Some(strings) = arrays[idx].as_string_opt::<i32>() else {
            tracing::debug!(
                "Not trimming {}.{}: column is {}",
                table.name,
                column,
                arrays[idx].data_type()
            );
            continue;
        };

        let trimmed: StringArray = strings
            .iter()
            .map(|v| v.map(str::trim).filter(|s| !s.is_empty()))
            .collect();
        arrays[idx] = Arc::new(trimmed);
    }

    let batch = RecordBatch::try_new(table.batch.schema(), arrays)?;
    Ok(table.with_batch(batch))
}

/// Drop rows with nulls in key columns or with too few values
///
/// A row survives when every `key_columns` entry is non-null and, if
/// `min_non_null` is set, at least that many of its cells are non-null.
pub fn drop_null_rows(
    table: Table,
    key_columns: &[String],
    min_non_null: Option<usize>,
) -> Result<Table> {
    let batch = &table.batch;
    let num_rows = batch.num_rows();
    let mut keep: Option<BooleanArray> = None;

    for column in key_columns {
        let idx = column_index(&table, column)?;
        let valid = is_not_null(batch.column(idx).as_ref())?;
        keep = Some(match keep {
            Some(mask) => and(&mask, &valid)?,
            None => valid,
        });
    }

    if let Some(threshold) = min_non_null {
        let nulls: Vec<Option<NullBuffer>> =
            batch.columns().iter().map(|c| c.logical_nulls()).collect();
        let enough: Vec<bool> = (0..num_rows)
            .map(|row| {
                let present = nulls
                    .iter()
                    .filter(|n| match n {
                        Some(nulls) => nulls.is_valid(row),
                        None => true,
                    })
                    .count();
                present >= threshold
            })
            .collect();
        let enough = BooleanArray::from(enough);
        keep = Some(match keep {
            Some(mask) => and(&mask, &enough)?,
            None => enough,
        });
    }

    let Some(keep) = keep else {
        return Ok(table);
    };

    let filtered = filter_record_batch(batch, &keep)?;
    let dropped = num_rows - filtered.num_rows();
    if dropped > 0 {
        tracing::warn!(
            "Dropped {} of {} rows from {} (null key values)",
            dropped,
            num_rows,
            table.name
        );
    }

    Ok(table.with_batch(filtered))
}

/// Prepend a sequential, non-null `Int64` key column numbered from 1
pub fn add_surrogate_key(table: Table, column: &str) -> Result<Table> {
    let schema = table.batch.schema();
    if schema.index_of(column).is_ok() {
        return Err(Error::transform(
            &table.name,
            format!("cannot add surrogate key '{column}': a column with that name already exists"),
        ));
    }

    let num_rows = i64::try_from(table.num_rows())
        .map_err(|e| Error::transform(&table.name, e))?;
    let ids = Int64Array::from_iter_values(1..=num_rows);

    let mut fields = Vec::with_capacity(schema.fields().len() + 1);
    fields.push(Field::new(column, DataType::Int64, false));
    fields.extend(schema.fields().iter().map(|f| f.as_ref().clone()));

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    arrays.push(Arc::new(ids));
    arrays.extend(table.batch.columns().iter().cloned());

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    let batch = RecordBatch::try_new(schema, arrays)?;
    Ok(table.with_batch(batch))
}

/// Shift an existing surrogate key so it continues after `offset`
///
/// Used when appending to a destination that already holds keys `1..=offset`.
pub fn offset_surrogate_key(table: Table, column: &str, offset: i64) -> Result<Table> {
    if offset == 0 {
        return Ok(table);
    }

    let idx = column_index(&table, column)?;
    let Some(ids) = table.batch.column(idx).as_primitive_opt::<Int64Type>() else {
        return Err(Error::transform(
            &table.name,
            format!(
                "surrogate key '{column}' is {}, expected Int64",
                table.batch.column(idx).data_type()
            ),
        ));
    };

    let shifted = ids.try_unary::<_, Int64Type, _>(|id| {
        id.checked_add(offset)
            .ok_or_else(|| ArrowError::ComputeError(format!("surrogate key overflow at {id}")))
    })?;

    let mut arrays: Vec<ArrayRef> = table.batch.columns().to_vec();
    arrays[idx] = Arc::new(shifted);
    let batch = RecordBatch::try_new(table.batch.schema(), arrays)?;
    Ok(table.with_batch(batch))
}
