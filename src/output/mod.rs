//! Output module
//!
//! Encodes Arrow record batches into what PostgreSQL consumes.
//!
//! # Overview
//!
//! This module provides:
//! - Casting columns to the Arrow type matching their SQL type
//! - Batched multi-row INSERT statements with bound parameters
//! - CSV payloads for `COPY ... FROM STDIN`

mod columns;
mod writer;

pub use columns::{prepare_columns, EncodedColumn};
pub use writer::{CopyEncoder, InsertEncoder, InsertStatement, SqlParam, MAX_PARAMETERS};
