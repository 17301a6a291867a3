//! CSV file decoding into Arrow record batches

use super::types::CsvOptions;
use crate::error::{Error, Result};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// Read a whole CSV file into a single `RecordBatch`
///
/// The first row is the header. Column types are inferred from the data and
/// the source column order is preserved. Any problem opening or parsing the
/// file is reported as [`Error::FileFormat`] naming the path.
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<RecordBatch> {
    let path = path.as_ref();

    let mut file = File::open(path).map_err(|e| Error::file_format(path, e))?;

    let mut format = Format::default()
        .with_header(true)
        .with_delimiter(options.delimiter_byte()?);
    if let Some(null_regex) = options.null_regex() {
        format = format.with_null_regex(null_regex);
    }

    let (schema, sampled) = format
        .infer_schema(&mut file, options.infer_schema_rows)
        .map_err(|e| Error::file_format(path, e))?;

    if schema.fields().is_empty() {
        return Err(Error::file_format(path, "file has no header row"));
    }

    tracing::debug!(
        "Inferred {} columns from {} rows of {}",
        schema.fields().len(),
        sampled,
        path.display()
    );

    file.seek(SeekFrom::Start(0))
        .map_err(|e| Error::file_format(path, e))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .with_batch_size(options.read_batch_size.max(1))
        .build(file)
        .map_err(|e| Error::file_format(path, e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::file_format(path, e))?;

    concat_batches(&schema, &batches).map_err(|e| Error::file_format(path, e))
}
