//! CLI argument parsing for waitval

use clap::Parser;
use std::path::PathBuf;
use waitval_core::config::{WaitConfig, DEFAULT_QUERY};
use waitval_core::resolver::{resolve_descriptor, IdentityProvider};
use waitval_core::target::TargetSpec;

/// Wait until a MySQL query returns one of the expected values
///
/// Runs the query once a second, each time on a new connection, and exits
/// as soon as any column of any row equals one of the `--value` arguments.
#[derive(Parser, Debug)]
#[command(name = "waitval")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// MySQL connection string, format 'user:password@tcp(localhost:port)/database'
    #[arg(long, default_value = "tcp(127.0.0.1:3306)/", env = "WAITVAL_SOURCE")]
    pub source: String,

    /// Path to a MySQL client credentials cnf/ini file
    #[arg(long, env = "WAITVAL_CREDENTIAL")]
    pub credential: Option<PathBuf>,

    /// Query to run on every poll
    #[arg(long, default_value = DEFAULT_QUERY, env = "WAITVAL_QUERY")]
    pub query: String,

    /// Value to wait for (--value 1 --value 2 waits for any of them)
    #[arg(long = "value", value_name = "VALUE")]
    pub values: Vec<String>,

    /// Column to look at, empty means any column
    #[arg(long, default_value = "", env = "WAITVAL_FIELD")]
    pub field: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl Cli {
    /// Build the wait configuration, resolving credentials if a file was given
    pub fn into_config(self, identity: &dyn IdentityProvider) -> waitval_core::Result<WaitConfig> {
        let target = TargetSpec::new(self.values, self.field)?;
        let descriptor = resolve_descriptor(&self.source, self.credential.as_deref(), identity)?;
        Ok(WaitConfig::new(&descriptor, self.query, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waitval_core::error::ErrorCategory;

    struct NoIdentity;

    impl IdentityProvider for NoIdentity {
        fn current_user(&self) -> waitval_core::Result<String> {
            Err(waitval_core::Error::config("identity not available in tests"))
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["waitval", "--value", "1"]).unwrap();

        assert_eq!(cli.source, "tcp(127.0.0.1:3306)/");
        assert_eq!(cli.query, "select 1");
        assert_eq!(cli.values, vec!["1".to_string()]);
        assert_eq!(cli.field, "");
        assert!(cli.credential.is_none());
    }

    #[test]
    fn test_repeated_values() {
        let cli = Cli::try_parse_from([
            "waitval", "--value", "1", "--value", "2", "--field", "status",
        ])
        .unwrap();

        let config = cli.into_config(&NoIdentity).unwrap();
        assert_eq!(config.target.targets(), ["1", "2"]);
        assert_eq!(config.target.field(), Some("status"));
    }

    #[test]
    fn test_missing_values_refuses_to_start() {
        let cli = Cli::try_parse_from(["waitval", "--query", "select 2"]).unwrap();

        let err = cli.into_config(&NoIdentity).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_usage_lists_value_flag() {
        use clap::CommandFactory;

        let usage = Cli::command().render_help().to_string();
        assert!(usage.contains("--value <VALUE>"));
        assert!(usage.contains("--source"));
    }

    #[test]
    fn test_source_is_trimmed() {
        let cli = Cli::try_parse_from([
            "waitval",
            "--source",
            " app:pw@tcp(db:3306)/app \n",
            "--value",
            "ok",
        ])
        .unwrap();

        let config = cli.into_config(&NoIdentity).unwrap();
        assert_eq!(config.connection.descriptor, "app:pw@tcp(db:3306)/app");
    }
}
