//! Input decoder module
//!
//! Reads the source CSV files into Arrow `RecordBatch`es.
//!
//! # Overview
//!
//! Each file must start with a header row. Column types are inferred from the
//! data (integers, floats, booleans, dates, timestamps, text) and cells
//! matching one of the configured null tokens become nulls.

mod csv;
mod types;

pub use self::csv::read_csv;
pub use types::CsvOptions;

#[cfg(test)]
mod tests;
