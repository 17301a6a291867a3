//! Tests for the configuration loader

use super::*;
use crate::template::TemplateContext;
use crate::types::{LoadMethod, TableRole, WriteMode};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn ctx() -> TemplateContext {
    let mut ctx = TemplateContext::new();
    ctx.env.insert("PGPASSWORD".to_string(), "hunter2".to_string());
    ctx
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_default_config_describes_wealth_accounts() {
    let config = PipelineConfig::default();
    validate_config(&config).unwrap();

    let names: Vec<String> = config.tables.iter().map(TableDefinition::table_name).collect();
    assert_eq!(
        names,
        vec!["account_series", "account_country", "account_data"]
    );

    let fact = config.fact_table().unwrap();
    assert_eq!(fact.table_name(), "account_data");
    assert_eq!(fact.key_columns, vec!["country_code", "series_code"]);
    assert_eq!(config.tables[1].min_non_null, Some(5));
    assert_eq!(config.surrogate_key, "id");
    assert_eq!(config.load_method, LoadMethod::Insert);
}

#[test]
fn test_empty_document_uses_defaults() {
    let config = load_config_with_context("{}", &ctx()).unwrap();
    assert_eq!(config.tables.len(), 3);
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 5432);
    assert_eq!(config.database.dbname, "wealth");
    assert!(config.database.create_database);
    assert_eq!(config.csv.null_values, vec!["", ".."]);
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_load_full_config() {
    let yaml = r#"
database:
  host: db.internal
  port: 6543
  user: loader
  password: "{{ env.PGPASSWORD }}"
  dbname: moeindb
  create_database: false
csv:
  delimiter: ";"
  null_values: ["NA"]
surrogate_key: row_id
load_method: copy
batch_size: 250
tables:
  - name: series
    path: data/series.csv
    key_columns: [code]
  - path: data/Wealth-AccountData.csv
    role: fact
    mode: append
    columns:
      - { name: row_id, sql_type: "BIGINT PRIMARY KEY" }
      - { name: country_code, sql_type: "VARCHAR REFERENCES series(code)" }
"#;

    let config = load_config_with_context(yaml, &ctx()).unwrap();
    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.database.port, 6543);
    assert_eq!(config.database.password.as_deref(), Some("hunter2"));
    assert!(!config.database.create_database);
    assert_eq!(config.csv.delimiter, ';');
    assert_eq!(config.surrogate_key, "row_id");
    assert_eq!(config.load_method, LoadMethod::Copy);
    assert_eq!(config.batch_size, 250);

    assert_eq!(config.tables[0].role, TableRole::Dimension);
    assert_eq!(config.tables[0].mode, WriteMode::Overwrite);
    assert_eq!(config.tables[1].table_name(), "wealth_accountdata");
    assert_eq!(config.tables[1].mode, WriteMode::Append);
    assert_eq!(config.tables[1].columns.len(), 2);
}

#[test]
fn test_undefined_env_variable_is_an_error() {
    let yaml = r#"
database:
  password: "{{ env.DEFINITELY_NOT_DEFINED }}"
"#;
    let err = load_config_with_context(yaml, &ctx()).unwrap_err();
    assert!(err.to_string().contains("env.DEFINITELY_NOT_DEFINED"));
}

#[test]
fn test_invalid_yaml() {
    let err = load_config_with_context("tables: [", &ctx()).unwrap_err();
    assert_eq!(err.kind(), "ConfigError");
}

#[test]
fn test_unknown_write_mode() {
    let yaml = r#"
tables:
  - path: a.csv
    role: fact
    mode: upsert
"#;
    assert!(load_config_with_context(yaml, &ctx()).is_err());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_requires_exactly_one_fact_table() {
    let yaml = r#"
tables:
  - path: a.csv
  - path: b.csv
"#;
    let err = load_config_with_context(yaml, &ctx()).unwrap_err();
    assert!(err.to_string().contains("Exactly one fact table"));

    let yaml = r#"
tables:
  - path: a.csv
    role: fact
  - path: b.csv
    role: fact
"#;
    assert!(load_config_with_context(yaml, &ctx()).is_err());
}

#[test]
fn test_empty_table_list() {
    let err = load_config_with_context("tables: []", &ctx()).unwrap_err();
    assert!(err.to_string().contains("At least one table"));
}

#[test]
fn test_duplicate_table_names() {
    let yaml = r#"
tables:
  - name: data
    path: a.csv
    role: fact
  - name: data
    path: b.csv
"#;
    let err = load_config_with_context(yaml, &ctx()).unwrap_err();
    assert!(err.to_string().contains("Duplicate table name"));
}

#[test]
fn test_key_columns_must_be_normalized() {
    let yaml = r#"
tables:
  - path: a.csv
    role: fact
    key_columns: ["Country Code"]
"#;
    let err = load_config_with_context(yaml, &ctx()).unwrap_err();
    assert!(err.to_string().contains("country_code"));
}

#[test]
fn test_table_name_longer_than_identifier_limit() {
    let long_name = format!("account_data_{}", "x".repeat(60));
    let yaml = format!(
        "tables:\n  - name: {long_name}\n    path: a.csv\n    role: fact\n"
    );
    let err = load_config_with_context(&yaml, &ctx()).unwrap_err();
    assert!(err.to_string().contains("Invalid table name"));
}

#[test]
fn test_long_file_stem_is_truncated() {
    let yaml = format!(
        "tables:\n  - path: datasets/{}.csv\n    role: fact\n",
        "Wealth-AccountData-".repeat(5)
    );
    let config = load_config_with_context(&yaml, &ctx()).unwrap();
    let name = config.tables[0].table_name();
    assert!(name.len() <= 63);
    assert!(name.starts_with("wealth_accountdata_wealth_accountdata"));
    assert!(!name.ends_with('_'));
}

#[test]
fn test_batch_size_bounds() {
    let mut config = PipelineConfig::default();
    config.batch_size = 0;
    assert!(validate_config(&config).is_err());
    config.batch_size = 70_000;
    assert!(validate_config(&config).is_err());
    config.batch_size = 500;
    assert!(validate_config(&config).is_ok());
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_resolve_relative_paths() {
    let mut config = PipelineConfig::default();
    config.tables[0].path = PathBuf::from("/abs/series.csv");
    config.resolve_paths(&PathBuf::from("/etc/starload"));

    assert_eq!(config.tables[0].path, PathBuf::from("/abs/series.csv"));
    assert_eq!(
        config.tables[2].path,
        PathBuf::from("/etc/starload/datasets/Wealth-AccountData.csv")
    );
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("load.yaml");
    std::fs::write(
        &path,
        "tables:\n  - path: facts.csv\n    role: fact\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.tables[0].path, dir.path().join("facts.csv"));
    assert_eq!(config.tables[0].table_name(), "facts");
}

#[test]
fn test_missing_config_file() {
    let err = load_config("/nonexistent/starload.yaml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/starload.yaml"));
}
