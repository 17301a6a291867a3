//! Column name normalization
//!
//! Turns CSV headers such as `Country Name` or `1995 [YR1995]` into names that
//! are valid unquoted SQL identifiers: `country_name`, `year_1995`.

use crate::error::Result;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// World Bank year headers: `1995 [YR1995]`
static YEAR_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4}) \[YR(\d{4})\]\s*$").expect("year header regex is valid")
});

/// Name used when nothing usable is left of a header
const FALLBACK_NAME: &str = "column";

/// PostgreSQL truncates identifiers longer than this (NAMEDATALEN - 1)
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Normalize a single column name
///
/// The result contains only `[a-z0-9_]`, starts with a letter, has no
/// repeated or trailing underscores, is at most [`MAX_IDENTIFIER_LEN`] bytes
/// long, and is a fixed point:
/// `clean_column_name(&clean_column_name(x)) == clean_column_name(x)`.
pub fn clean_column_name(name: &str) -> String {
    truncate_identifier(&normalize(name), MAX_IDENTIFIER_LEN)
}

fn normalize(name: &str) -> String {
    if let Some(caps) = YEAR_HEADER.captures(name) {
        if caps[1] == caps[2] {
            return format!("year_{}", &caps[1]);
        }
    }

    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            cleaned.push(c);
        } else if !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }

    let collapsed = cleaned.trim_matches('_');
    let trimmed = collapsed.trim_start_matches(|c: char| !c.is_ascii_lowercase());

    if !trimmed.is_empty() {
        trimmed.to_string()
    } else if !collapsed.is_empty() {
        // digits only, e.g. a bare `1995` header
        format!("col_{collapsed}")
    } else {
        FALLBACK_NAME.to_string()
    }
}

/// Normalize a list of column names, keeping them unique
///
/// A name that collides with an earlier one gets a `_2`, `_3`, ... suffix.
pub fn clean_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .iter()
        .map(|name| {
            let base = clean_column_name(name.as_ref());
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                let suffix = format!("_{n}");
                let stem = truncate_identifier(&base, MAX_IDENTIFIER_LEN - suffix.len());
                candidate = format!("{stem}{suffix}");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Cut a cleaned name to `max` bytes without leaving a trailing underscore
fn truncate_identifier(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    // cleaned names are ASCII, so any byte offset is a char boundary
    name[..max].trim_end_matches('_').to_string()
}

/// Rename every column of a batch to its normalized name
///
/// Column data and order are untouched.
pub fn clean_cols(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let cleaned = clean_column_names(&names);

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .zip(cleaned)
        .map(|(field, name)| field.as_ref().clone().with_name(name))
        .collect();

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(RecordBatch::try_new(schema, batch.columns().to_vec())?)
}
