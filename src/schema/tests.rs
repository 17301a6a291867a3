//! Tests for the schema module

use super::*;
use crate::types::ColumnDef;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use test_case::test_case;

fn fact_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("country_code", DataType::Utf8, true),
        Field::new("year_1995", DataType::Float64, true),
    ])
}

// ============================================================================
// SqlType Tests
// ============================================================================

#[test_case(DataType::Int64 => SqlType::BigInt)]
#[test_case(DataType::Int32 => SqlType::BigInt)]
#[test_case(DataType::Float64 => SqlType::DoublePrecision)]
#[test_case(DataType::Boolean => SqlType::Boolean)]
#[test_case(DataType::Utf8 => SqlType::Text)]
#[test_case(DataType::Date32 => SqlType::Date)]
#[test_case(DataType::Timestamp(TimeUnit::Second, None) => SqlType::Timestamp)]
#[test_case(DataType::Null => SqlType::Text)]
#[test_case(DataType::UInt64 => SqlType::Text)]
fn test_sql_type_from_arrow(data_type: DataType) -> SqlType {
    SqlType::from_arrow(&data_type)
}

#[test]
fn test_sql_type_names() {
    assert_eq!(SqlType::BigInt.to_string(), "BIGINT");
    assert_eq!(SqlType::DoublePrecision.as_sql(), "DOUBLE PRECISION");
    assert_eq!(
        SqlType::Timestamp.arrow_type(),
        DataType::Timestamp(TimeUnit::Microsecond, None)
    );
}

#[test_case(SqlType::BigInt, "integer" => true)]
#[test_case(SqlType::BigInt, "numeric" => true)]
#[test_case(SqlType::BigInt, "boolean" => false)]
#[test_case(SqlType::DoublePrecision, "bigint" => false)]
#[test_case(SqlType::DoublePrecision, "real" => true)]
#[test_case(SqlType::Text, "character varying" => true)]
#[test_case(SqlType::Text, "integer" => false)]
#[test_case(SqlType::BigInt, "character varying" => true)]
#[test_case(SqlType::Boolean, "text" => true)]
#[test_case(SqlType::Date, "timestamp without time zone" => true)]
#[test_case(SqlType::Timestamp, "TIMESTAMP WITH TIME ZONE" => true)]
fn test_assignable_to(sql_type: SqlType, column_type: &str) -> bool {
    sql_type.assignable_to(column_type)
}

// ============================================================================
// DDL Inference Tests
// ============================================================================

#[test]
fn test_infer_columns_fact() {
    let columns = infer_columns(&fact_schema(), Some("id"));
    assert_eq!(
        columns,
        vec![
            ColumnDef::new("id", "BIGINT PRIMARY KEY"),
            ColumnDef::new("country_code", "TEXT"),
            ColumnDef::new("year_1995", "DOUBLE PRECISION"),
        ]
    );
}

#[test]
fn test_infer_columns_not_null_without_primary_key() {
    let columns = infer_columns(&fact_schema(), None);
    assert_eq!(columns[0], ColumnDef::new("id", "BIGINT NOT NULL"));
}

// ============================================================================
// Compatibility Tests
// ============================================================================

fn existing(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(n, t)| ((*n).to_string(), (*t).to_string()))
        .collect()
}

#[test]
fn test_compatible_destination() {
    let destination = existing(&[
        ("id", "integer"),
        ("country_code", "character varying"),
        ("year_1995", "character varying"),
        ("extra", "text"),
    ]);
    assert!(check_compatibility("account_data", &fact_schema(), &destination).is_ok());
}

#[test]
fn test_missing_destination_column() {
    let destination = existing(&[("id", "bigint"), ("country_code", "text")]);
    let err = check_compatibility("account_data", &fact_schema(), &destination).unwrap_err();
    assert_eq!(err.kind(), "WriteError");
    assert!(err.to_string().contains("year_1995"));
}

#[test]
fn test_incompatible_destination_type() {
    let destination = existing(&[
        ("id", "bigint"),
        ("country_code", "integer"),
        ("year_1995", "double precision"),
    ]);
    let err = check_compatibility("account_data", &fact_schema(), &destination).unwrap_err();
    assert!(err.to_string().contains("country_code"));
    assert!(err.to_string().contains("integer"));
}
