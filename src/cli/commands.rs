//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Load the Wealth Accounts CSV datasets into a PostgreSQL star schema
#[derive(Parser, Debug)]
#[command(name = "starload")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Load configuration file (YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Verbose output (debug logging, including SQL statements)
    #[arg(short, long)]
    pub verbose: bool,

    /// Read and process the input files without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["starload", "-c", "wealth.yaml", "--dry-run"]);
        assert_eq!(cli.config, PathBuf::from("wealth.yaml"));
        assert!(cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["starload", "--verbose"]).is_err());
    }
}
