//! CLI runner - executes a load run

use crate::cli::commands::Cli;
use crate::database::DatabaseConnector;
use crate::error::{Error, Result};
use crate::loader::{load_config, DatabaseConfig, PipelineConfig};
use crate::processor::DataProcessor;
use crate::types::{LoadReport, Table};
use serde_json::{json, Value};
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the load described by the configuration file
    ///
    /// Prints one JSON line per table on stdout.
    pub async fn run(&self) -> Result<()> {
        let start = Instant::now();
        let config = load_config(&self.cli.config)?;
        tracing::info!(
            "Loaded {} table definitions from {}",
            config.tables.len(),
            self.cli.config.display()
        );

        let summaries: Vec<Value> = if self.cli.dry_run {
            prepare(&config)?.iter().map(table_summary).collect()
        } else {
            load(&config)
                .await?
                .iter()
                .map(|report| json!(report))
                .collect()
        };

        for summary in &summaries {
            println!("{summary}");
        }

        tracing::info!("Finished in {:.2}s", start.elapsed().as_secs_f64());
        Ok(())
    }
}

/// Read and process every configured table
pub fn prepare(config: &PipelineConfig) -> Result<Vec<Table>> {
    let processor = DataProcessor::new(config);
    let tables = processor.read_tables()?;
    processor.process_data(tables)
}

/// Dry-run summary line for a processed table
pub fn table_summary(table: &Table) -> Value {
    json!({
        "table": table.name,
        "role": table.role,
        "rows": table.num_rows(),
        "columns": table.column_names(),
        "dry_run": true,
    })
}

/// Full run: read, process, then write every table in configuration order
pub async fn load(config: &PipelineConfig) -> Result<Vec<LoadReport>> {
    let processor = DataProcessor::new(config);
    let tables = processor.process_data(processor.read_tables()?)?;

    let mut connector = DatabaseConnector::connect(&config.database).await?;
    let result = write_all(&processor, &tables, &mut connector, &config.database).await;
    connector.close().await;
    result
}

async fn write_all(
    processor: &DataProcessor,
    tables: &[Table],
    connector: &mut DatabaseConnector,
    database: &DatabaseConfig,
) -> Result<Vec<LoadReport>> {
    ensure_database(connector, database).await?;
    if connector.database() != database.dbname {
        connector.switch_database(&database.dbname).await?;
    }

    let mut reports = Vec::with_capacity(tables.len());
    for (def, table) in processor.tables().iter().zip(tables) {
        let report = processor
            .write_to_postgres(table, connector, &table.name, def.mode)
            .await?;
        reports.push(report);
    }
    Ok(reports)
}

/// Create the target database when it is missing and creation is allowed
async fn ensure_database(connector: &DatabaseConnector, database: &DatabaseConfig) -> Result<()> {
    if connector.check_database_exists(&database.dbname).await? {
        tracing::debug!("Database {} exists", database.dbname);
        return Ok(());
    }

    if !database.create_database {
        return Err(Error::config(format!(
            "Database '{}' does not exist and create_database is disabled",
            database.dbname
        )));
    }

    connector.create_database(&database.dbname).await
}
