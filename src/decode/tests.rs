//! Tests for the decode module

use super::*;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int64Type};
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// CsvOptions Tests
// ============================================================================

#[test]
fn test_csv_options_default() {
    let options = CsvOptions::default();
    assert_eq!(options.delimiter, ',');
    assert_eq!(options.null_values, vec!["", ".."]);
    assert!(options.infer_schema_rows.is_none());
}

#[test]
fn test_null_regex_matches_whole_cell() {
    let regex = CsvOptions::default().null_regex().unwrap();
    assert!(regex.is_match(""));
    assert!(regex.is_match(".."));
    assert!(!regex.is_match("..."));
    assert!(!regex.is_match("1.5"));
    assert!(!regex.is_match("a..b"));
}

#[test]
fn test_null_regex_disabled() {
    let options = CsvOptions::default().with_null_values(Vec::<String>::new());
    assert!(options.null_regex().is_none());
}

#[test]
fn test_delimiter_must_be_ascii() {
    assert_eq!(CsvOptions::default().delimiter_byte().unwrap(), b',');
    assert_eq!(
        CsvOptions::default().with_delimiter('\t').delimiter_byte().unwrap(),
        b'\t'
    );
    assert!(CsvOptions::default().with_delimiter('§').delimiter_byte().is_err());
}

// ============================================================================
// read_csv Tests
// ============================================================================

#[test]
fn test_read_csv_preserves_column_order() {
    let file = csv_file(
        "Country Name,Country Code,Series Name,Series Code,1995 [YR1995]\n\
         Albania,ALB,Total wealth,NW.TOW.TO,123\n\
         Algeria,DZA,Total wealth,NW.TOW.TO,..\n",
    );

    let batch = read_csv(file.path(), &CsvOptions::default()).unwrap();
    let names: Vec<&str> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();

    assert_eq!(
        names,
        vec![
            "Country Name",
            "Country Code",
            "Series Name",
            "Series Code",
            "1995 [YR1995]"
        ]
    );
    assert_eq!(batch.num_rows(), 2);
}

#[test]
fn test_read_csv_null_tokens_and_types() {
    let file = csv_file("code,value\nALB,123\nDZA,..\nAGO,\n");

    let batch = read_csv(file.path(), &CsvOptions::default()).unwrap();
    let value = batch.column(1);

    assert_eq!(value.data_type(), &DataType::Int64);
    let value = value.as_primitive::<Int64Type>();
    assert_eq!(value.value(0), 123);
    assert!(value.is_null(1));
    assert!(value.is_null(2));
}

#[test]
fn test_read_csv_custom_delimiter() {
    let file = csv_file("a;b\n1;x\n2;y\n");
    let options = CsvOptions::default().with_delimiter(';');

    let batch = read_csv(file.path(), &options).unwrap();
    assert_eq!(batch.num_columns(), 2);
    assert_eq!(batch.column(1).as_string::<i32>().value(1), "y");
}

#[test]
fn test_read_csv_header_only() {
    let file = csv_file("code,name\n");
    let batch = read_csv(file.path(), &CsvOptions::default()).unwrap();
    assert_eq!(batch.num_columns(), 2);
    assert_eq!(batch.num_rows(), 0);
}

#[test]
fn test_read_csv_missing_file() {
    let err = read_csv("/nonexistent/Wealth-AccountData.csv", &CsvOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), "FileFormatError");
    assert!(err.to_string().contains("Wealth-AccountData.csv"));
}

#[test]
fn test_read_csv_empty_file() {
    let file = csv_file("");
    let err = read_csv(file.path(), &CsvOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "FileFormatError");
}

#[test]
fn test_read_csv_ragged_rows() {
    let file = csv_file("a,b,c\n1,2,3\n4,5\n");
    let err = read_csv(file.path(), &CsvOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "FileFormatError");
}
