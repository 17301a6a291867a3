//! SQL schema module
//!
//! Maps the Arrow types inferred from CSV data onto PostgreSQL column types.
//!
//! # Features
//!
//! - **DDL Inference**: column definitions for `CREATE TABLE`
//! - **Compatibility Checks**: compare an in-memory table with an existing
//!   destination table before appending

mod inference;
mod types;

pub use inference::{check_compatibility, infer_columns};
pub use types::SqlType;

#[cfg(test)]
mod tests;
