//! PostgreSQL session wrapper
//!
//! One [`DatabaseConnector`] owns one session. Statements are sent outside
//! any explicit transaction, so every statement commits on its own.

use crate::error::{describe_pg_error, Error, Result};
use crate::loader::DatabaseConfig;
use crate::types::{ColumnDef, IfExists};
use bytes::Bytes;
use futures::SinkExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::config::Host;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Row};

/// How long `close` waits for the connection task to say goodbye
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of [`DatabaseConnector::execute_query`]
#[derive(Debug)]
pub enum QueryOutput {
    /// Rows returned by a query
    Rows(Vec<Row>),
    /// Rows affected by a mutation
    Affected(u64),
}

impl QueryOutput {
    /// Returned rows (empty for mutations)
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            QueryOutput::Rows(rows) => rows,
            QueryOutput::Affected(_) => Vec::new(),
        }
    }

    /// Rows returned or affected
    pub fn count(&self) -> u64 {
        match self {
            QueryOutput::Rows(rows) => rows.len() as u64,
            QueryOutput::Affected(n) => *n,
        }
    }
}

/// A single PostgreSQL session
pub struct DatabaseConnector {
    /// Connection settings without the database name
    config: Config,
    /// Database of the current session
    dbname: String,
    client: Option<Client>,
    connection: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for DatabaseConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnector")
            .field("target", &self.connection_info())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl DatabaseConnector {
    /// Connect to the maintenance database named by `credentials`
    pub async fn connect(credentials: &DatabaseConfig) -> Result<Self> {
        let config = build_pg_config(credentials)?;
        let dbname = initial_database(credentials, &config);
        Self::open(config, dbname).await
    }

    /// Connect straight to `dbname`
    pub async fn connect_to(credentials: &DatabaseConfig, dbname: &str) -> Result<Self> {
        let config = build_pg_config(credentials)?;
        Self::open(config, dbname.to_string()).await
    }

    async fn open(config: Config, dbname: String) -> Result<Self> {
        let (client, connection) = open_session(&config, &dbname).await?;
        let connector = Self {
            config,
            dbname,
            client: Some(client),
            connection: Some(connection),
        };
        tracing::info!("Connected to {} (autocommit)", connector.connection_info());
        Ok(connector)
    }

    /// Database of the current session
    pub fn database(&self) -> &str {
        &self.dbname
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    /// `user@host:port/dbname`, without the password
    pub fn connection_info(&self) -> String {
        describe_target(&self.config, &self.dbname)
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::connection(self.connection_info(), "connection is closed"))
    }

    /// Run one parameterized statement
    ///
    /// Statements that produce columns return their rows; everything else
    /// returns the number of affected rows.
    pub async fn execute_query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<QueryOutput> {
        let client = self.client()?;
        tracing::debug!("Executing query: {}", sql);

        let statement = client
            .prepare(sql)
            .await
            .map_err(|e| Error::query(sql, describe_pg_error(&e)))?;

        if statement.columns().is_empty() {
            let affected = client
                .execute(&statement, params)
                .await
                .map_err(|e| Error::query(sql, describe_pg_error(&e)))?;
            Ok(QueryOutput::Affected(affected))
        } else {
            let rows = client
                .query(&statement, params)
                .await
                .map_err(|e| Error::query(sql, describe_pg_error(&e)))?;
            Ok(QueryOutput::Rows(rows))
        }
    }

    /// Run parameterless statements through the simple query protocol
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        let client = self.client()?;
        tracing::debug!("Executing batch: {}", sql);

        client
            .batch_execute(sql)
            .await
            .map_err(|e| Error::query(sql, describe_pg_error(&e)))
    }

    /// Whether a database with this name exists on the server
    pub async fn check_database_exists(&self, name: &str) -> Result<bool> {
        let output = self
            .execute_query("SELECT 1 FROM pg_database WHERE datname = $1", &[&name])
            .await?;
        Ok(output.count() > 0)
    }

    /// Create a database
    pub async fn create_database(&self, name: &str) -> Result<()> {
        self.execute_batch(&format!("CREATE DATABASE {}", quote_ident(name)))
            .await?;
        tracing::info!("Created database {}", name);
        Ok(())
    }

    /// Replace the current session with one on database `name`
    ///
    /// The new session is opened before the old one is released, so a failed
    /// switch leaves the connector on its previous database.
    pub async fn switch_database(&mut self, name: &str) -> Result<()> {
        let (client, connection) = open_session(&self.config, name).await?;
        let previous_client = self.client.replace(client);
        let previous_connection = self.connection.replace(connection);
        shutdown(previous_client, previous_connection).await;
        self.dbname = name.to_string();
        tracing::info!("Switched to {}", self.connection_info());
        Ok(())
    }

    /// Whether `name` exists in the current schema
    pub async fn table_exists(&self, name: &str) -> Result<bool> {
        let output = self
            .execute_query(
                "SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1",
                &[&name],
            )
            .await?;
        Ok(output.count() > 0)
    }

    /// `(column_name, data_type)` of an existing table, in column order
    pub async fn table_columns(&self, name: &str) -> Result<Vec<(String, String)>> {
        let sql = "SELECT column_name::text, data_type::text FROM information_schema.columns \
                   WHERE table_schema = current_schema() AND table_name = $1 \
                   ORDER BY ordinal_position";
        let rows = self.execute_query(sql, &[&name]).await?.into_rows();

        rows.iter()
            .map(|row| {
                let column: String = row.try_get(0).map_err(|e| Error::query(sql, e))?;
                let data_type: String = row.try_get(1).map_err(|e| Error::query(sql, e))?;
                Ok((column, data_type))
            })
            .collect()
    }

    /// Number of rows in a table
    pub async fn count_rows(&self, name: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(name));
        let rows = self.execute_query(&sql, &[]).await?.into_rows();
        let row = rows
            .first()
            .ok_or_else(|| Error::query(&sql, "COUNT(*) returned no row"))?;
        row.try_get(0).map_err(|e| Error::query(&sql, e))
    }

    /// Largest value of an integer column, or 0 for an empty table
    pub async fn max_value(&self, table: &str, column: &str) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX({}), 0)::BIGINT FROM {}",
            quote_ident(column),
            quote_ident(table)
        );
        let rows = self.execute_query(&sql, &[]).await?.into_rows();
        let row = rows
            .first()
            .ok_or_else(|| Error::query(&sql, "MAX() returned no row"))?;
        row.try_get(0).map_err(|e| Error::query(&sql, e))
    }

    /// Create a table from column definitions
    pub async fn create_table(
        &self,
        name: &str,
        columns: &[ColumnDef],
        if_exists: IfExists,
    ) -> Result<()> {
        let create = create_table_sql(name, columns, if_exists)?;

        if if_exists == IfExists::Replace {
            self.execute_batch(&format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(name)))
                .await?;
        }
        self.execute_batch(&create).await?;

        tracing::info!("Created table {} ({} columns)", name, columns.len());
        Ok(())
    }

    /// Stream a payload into the database with `COPY ... FROM STDIN`
    pub async fn copy_in(&self, sql: &str, payload: Vec<u8>) -> Result<u64> {
        let client = self.client()?;
        tracing::debug!("Executing copy: {} ({} bytes)", sql, payload.len());

        let sink = client
            .copy_in::<_, Bytes>(sql)
            .await
            .map_err(|e| Error::query(sql, describe_pg_error(&e)))?;
        futures::pin_mut!(sink);

        if !payload.is_empty() {
            sink.send(Bytes::from(payload))
                .await
                .map_err(|e| Error::query(sql, describe_pg_error(&e)))?;
        }

        sink.finish()
            .await
            .map_err(|e| Error::query(sql, describe_pg_error(&e)))
    }

    /// Release the session. Calling it again does nothing
    ///
    /// Dropping the client lets the connection task send `Terminate` and
    /// finish; it is aborted only if it does not finish in time.
    pub async fn close(&mut self) {
        let client = self.client.take();
        let connection = self.connection.take();
        if client.is_none() {
            return;
        }

        shutdown(client, connection).await;
        tracing::info!("Closed connection to {}", self.connection_info());
    }
}

impl Drop for DatabaseConnector {
    fn drop(&mut self) {
        // not awaited: close() is the graceful path
        self.client.take();
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
    }
}

/// Drop the client and wait for its connection task to end
async fn shutdown(client: Option<Client>, connection: Option<JoinHandle<()>>) {
    drop(client);
    let Some(mut connection) = connection else {
        return;
    };

    if tokio::time::timeout(CLOSE_TIMEOUT, &mut connection)
        .await
        .is_err()
    {
        tracing::warn!("Connection task did not finish after close, aborting it");
        connection.abort();
    }
}

/// Open a session on `dbname` and drive its connection on the runtime
async fn open_session(config: &Config, dbname: &str) -> Result<(Client, JoinHandle<()>)> {
    let mut config = config.clone();
    config.dbname(dbname);

    let (client, connection) = config
        .connect(NoTls)
        .await
        .map_err(|e| Error::connection(describe_target(&config, dbname), describe_pg_error(&e)))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok((client, handle))
}

/// Driver settings from the configuration
pub(crate) fn build_pg_config(credentials: &DatabaseConfig) -> Result<Config> {
    let mut config = match &credentials.connection_string {
        Some(url) => url
            .parse::<Config>()
            .map_err(|e| Error::config(format!("Invalid connection string: {e}")))?,
        None => {
            let mut config = Config::new();
            config
                .host(&credentials.host)
                .port(credentials.port)
                .user(&credentials.user);
            if let Some(password) = &credentials.password {
                config.password(password);
            }
            config
        }
    };

    if config.get_connect_timeout().is_none() {
        config.connect_timeout(Duration::from_secs(credentials.connect_timeout_secs));
    }
    config.application_name(env!("CARGO_PKG_NAME"));

    Ok(config)
}

/// Database for the first session
pub(crate) fn initial_database(credentials: &DatabaseConfig, config: &Config) -> String {
    credentials
        .maintenance_db
        .clone()
        .or_else(|| config.get_dbname().map(str::to_string))
        .unwrap_or_else(|| "postgres".to_string())
}

fn describe_target(config: &Config, dbname: &str) -> String {
    let host = match config.get_hosts().first() {
        Some(Host::Tcp(host)) => host.clone(),
        #[cfg(unix)]
        Some(Host::Unix(path)) => path.display().to_string(),
        None => "localhost".to_string(),
    };
    let port = config.get_ports().first().copied().unwrap_or(5432);
    let user = config.get_user().unwrap_or("postgres");
    format!("{user}@{host}:{port}/{dbname}")
}

/// `CREATE TABLE` statement for the given columns
pub(crate) fn create_table_sql(
    name: &str,
    columns: &[ColumnDef],
    if_exists: IfExists,
) -> Result<String> {
    let prefix = match if_exists {
        IfExists::Skip => "CREATE TABLE IF NOT EXISTS",
        IfExists::Replace | IfExists::Error => "CREATE TABLE",
    };

    if columns.is_empty() {
        return Err(Error::query(
            format!("{prefix} {} ()", quote_ident(name)),
            "no columns specified for table creation",
        ));
    }

    let column_defs = columns
        .iter()
        .map(|c| format!("    {} {}", quote_ident(&c.name), c.sql_type))
        .collect::<Vec<_>>()
        .join(",\n");

    Ok(format!("{prefix} {} (\n{column_defs}\n)", quote_ident(name)))
}

/// Quote an identifier for use in SQL text
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
