//! PostgreSQL connectivity
//!
//! Wraps one tokio-postgres session per [`DatabaseConnector`]: running
//! statements, checking for and switching between databases, creating tables
//! and streaming `COPY` payloads.

mod connector;

pub use connector::{quote_ident, DatabaseConnector, QueryOutput};
