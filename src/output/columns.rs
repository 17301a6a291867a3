//! Column preparation shared by the INSERT and COPY encoders

use crate::error::Result;
use crate::schema::SqlType;
use arrow::array::{Array, ArrayRef};
use arrow::compute::cast;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// One column cast to the Arrow type matching its SQL type
#[derive(Debug, Clone)]
pub struct EncodedColumn {
    pub name: String,
    pub sql_type: SqlType,
    pub array: ArrayRef,
}

impl EncodedColumn {
    /// True when the column holds no values at all
    pub fn is_all_null(&self) -> bool {
        let nulls = self
            .array
            .logical_nulls()
            .map_or(0, |nulls| nulls.null_count());
        nulls == self.array.len()
    }
}

/// Cast every column of `batch` to the Arrow type its SQL type is encoded from
pub fn prepare_columns(batch: &RecordBatch) -> Result<Vec<EncodedColumn>> {
    batch
        .schema()
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| {
            let sql_type = SqlType::from_arrow(field.data_type());
            let target = sql_type.arrow_type();
            let array = if array.data_type() == &target {
                Arc::clone(array)
            } else {
                cast(array, &target)?
            };
            Ok(EncodedColumn {
                name: field.name().clone(),
                sql_type,
                array,
            })
        })
        .collect()
}

/// Reassemble prepared columns into a batch
pub fn prepared_batch(columns: &[EncodedColumn]) -> Result<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|c| Field::new(&c.name, c.array.data_type().clone(), true))
        .collect();
    let arrays: Vec<ArrayRef> = columns.iter().map(|c| Arc::clone(&c.array)).collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
