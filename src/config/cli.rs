//! CLI argument parsing using clap

use crate::config::{OltpOpts, RunnerOpts};
use clap::{Parser, Subcommand};

/// SQLPulse - OLTP database load generator
#[derive(Parser, Debug)]
#[command(name = "sqlpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub runner: RunnerOpts,

    #[command(flatten)]
    pub oltp: OltpOpts,

    #[command(subcommand)]
    pub command: BenchCommand,
}

/// Benchmark selection.
#[derive(Subcommand, Debug)]
pub enum BenchCommand {
    /// Read-Only OLTP benchmark
    #[command(name = "oltp_read_only")]
    OltpReadOnly {
        #[command(subcommand)]
        action: OltpAction,
    },

    /// Read/Write OLTP benchmark
    #[command(name = "oltp_read_write")]
    OltpReadWrite {
        #[command(subcommand)]
        action: OltpAction,
    },
}

/// What to do with the selected benchmark.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OltpAction {
    /// Prepare tables and records
    Prepare,
    /// Run benchmark
    Run,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbDriver;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sqlpulse", "oltp_read_only", "run"]).unwrap();

        assert_eq!(cli.runner.threads, 1);
        assert_eq!(cli.runner.events, 0);
        assert_eq!(cli.runner.time, 10);
        assert_eq!(cli.runner.report_interval, 0);
        assert!(!cli.runner.histogram);
        assert_eq!(cli.runner.percentile, 95);
        assert!(cli.runner.json_output.is_none());

        assert_eq!(cli.oltp.tables, 1);
        assert_eq!(cli.oltp.table_size, 10_000);
        assert_eq!(cli.oltp.db_driver, DbDriver::MySql);
        assert_eq!(cli.oltp.mysql.mysql_port, 3306);
        assert_eq!(cli.oltp.pgsql.pgsql_port, 5432);

        assert!(matches!(
            cli.command,
            BenchCommand::OltpReadOnly {
                action: OltpAction::Run
            }
        ));
    }

    #[test]
    fn test_full_flag_set() {
        let cli = Cli::try_parse_from([
            "sqlpulse",
            "--threads",
            "16",
            "--events",
            "100000",
            "--time",
            "60",
            "--report-interval",
            "5",
            "--histogram",
            "on",
            "--percentile",
            "99",
            "--tables",
            "8",
            "--table-size",
            "50000",
            "--db-driver",
            "pgsql",
            "--pgsql-host",
            "db.internal",
            "oltp_read_write",
            "prepare",
        ])
        .unwrap();

        assert_eq!(cli.runner.threads, 16);
        assert_eq!(cli.runner.events, 100_000);
        assert_eq!(cli.runner.time, 60);
        assert_eq!(cli.runner.report_interval, 5);
        assert!(cli.runner.histogram);
        assert_eq!(cli.runner.percentile, 99);
        assert_eq!(cli.oltp.tables, 8);
        assert_eq!(cli.oltp.table_size, 50_000);
        assert_eq!(cli.oltp.db_driver, DbDriver::PgSql);
        assert_eq!(cli.oltp.pgsql.pgsql_host, "db.internal");
        assert!(matches!(
            cli.command,
            BenchCommand::OltpReadWrite {
                action: OltpAction::Prepare
            }
        ));
    }

    #[test]
    fn test_histogram_rejects_other_values() {
        let result =
            Cli::try_parse_from(["sqlpulse", "--histogram", "yes", "oltp_read_only", "run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["sqlpulse"]).is_err());
    }
}
