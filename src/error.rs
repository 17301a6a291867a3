//! Error types for starload
//!
//! Every stage of the pipeline returns `Result<T, Error>`. Nothing is retried:
//! an error aborts the run and is reported with the statement, file path or
//! table name that caused it.

use std::path::Path;
use thiserror::Error;

/// The main error type for starload
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // Database Errors
    // ============================================================================
    #[error("Connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    #[error("Query failed: {message}\n  statement: {statement}")]
    Query { statement: String, message: String },

    #[error("Write to table '{table}' failed: {message}")]
    Write { table: String, message: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Invalid input file {path}: {message}")]
    FileFormat { path: String, message: String },

    #[error("Failed to transform table '{table}': {message}")]
    Transform { table: String, message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a connection error
    pub fn connection(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Create a query error carrying the offending statement
    pub fn query(statement: impl Into<String>, message: impl ToString) -> Self {
        Self::Query {
            statement: statement.into(),
            message: message.to_string(),
        }
    }

    /// Create a write error
    pub fn write(table: impl Into<String>, message: impl ToString) -> Self {
        Self::Write {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create a file format error
    pub fn file_format(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::FileFormat {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a transform error
    pub fn transform(table: impl Into<String>, message: impl ToString) -> Self {
        Self::Transform {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Short name of the error kind, used in the run summary
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. } | Error::YamlParse(_) | Error::UndefinedVariable { .. } => {
                "ConfigError"
            }
            Error::Connection { .. } => "ConnectionError",
            Error::Query { .. } => "QueryError",
            Error::Write { .. } => "WriteError",
            Error::FileFormat { .. } => "FileFormatError",
            Error::Transform { .. } | Error::Arrow(_) => "TransformError",
            Error::Io(_) => "IoError",
        }
    }
}

/// Render a driver error including the server-side detail when present
pub(crate) fn describe_pg_error(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{} ({}): {detail}", db.message(), db.code().code()),
            None => format!("{} ({})", db.message(), db.code().code()),
        },
        None => with_sources(err),
    }
}

/// Display an error followed by every cause in its `source()` chain
pub(crate) fn with_sources(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Result type alias for starload
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::query("SELEC 1", "syntax error at or near \"SELEC\"");
        let msg = err.to_string();
        assert!(msg.contains("SELEC 1"));
        assert!(msg.contains("syntax error"));

        let err = Error::file_format("datasets/missing.csv", "No such file or directory");
        assert!(err.to_string().contains("datasets/missing.csv"));

        let err = Error::write("account_data", "column \"foo\" does not exist");
        assert!(err.to_string().contains("account_data"));
    }

    #[derive(Debug, Error)]
    #[error("error connecting to server")]
    struct ConnectFailed(#[source] std::io::Error);

    #[test]
    fn test_with_sources_includes_cause() {
        let err = ConnectFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ));
        assert_eq!(
            with_sources(&err),
            "error connecting to server: Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_with_sources_skips_repeated_cause() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(with_sources(&err), "IO error: gone");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::connection("db", "refused").kind(), "ConnectionError");
        assert_eq!(Error::query("SELECT 1", "x").kind(), "QueryError");
        assert_eq!(Error::file_format("a.csv", "x").kind(), "FileFormatError");
        assert_eq!(Error::write("t", "x").kind(), "WriteError");
        assert_eq!(Error::transform("t", "x").kind(), "TransformError");
        assert_eq!(Error::config("x").kind(), "ConfigError");
    }
}
