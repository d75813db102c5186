//! Configuration
//!
//! Typed option structs shared by the CLI and the driver. The runner
//! options mirror sysbench's global flags; the OLTP options cover table
//! shape and connection parameters for both supported database drivers.

pub mod cli;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Global driver options (sysbench-compatible flags).
#[derive(Debug, Clone, Args)]
pub struct RunnerOpts {
    /// Number of worker threads
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Limit for total number of events (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub events: u64,

    /// Limit for total execution time in seconds
    #[arg(long, default_value_t = 10)]
    pub time: u64,

    /// Periodically report intermediate statistics with the specified
    /// interval in seconds (0 disables intermediate reports)
    #[arg(long, default_value_t = 0)]
    pub report_interval: u64,

    /// Print latency histogram in report
    #[arg(
        long,
        default_value = "off",
        value_parser = parse_on_off,
        action = clap::ArgAction::Set,
        value_name = "on|off"
    )]
    pub histogram: bool,

    /// Percentile to calculate in latency statistics (1-100)
    #[arg(long, default_value_t = 95)]
    pub percentile: u32,

    /// Write a machine-readable summary of the final report to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,
}

fn parse_on_off(value: &str) -> Result<bool, String> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

/// Database driver selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DbDriver {
    #[value(name = "mysql")]
    MySql,
    #[value(name = "pgsql")]
    PgSql,
}

/// OLTP benchmark options: table shape plus per-driver connection details.
#[derive(Debug, Clone, Args)]
pub struct OltpOpts {
    /// Number of tables
    #[arg(long, default_value_t = 1)]
    pub tables: u32,

    /// Number of rows per table
    #[arg(long, default_value_t = 10_000)]
    pub table_size: u32,

    /// Specifies database driver to use
    #[arg(long, value_enum, default_value_t = DbDriver::MySql)]
    pub db_driver: DbDriver,

    #[command(flatten)]
    pub mysql: MySqlOpts,

    #[command(flatten)]
    pub pgsql: PgSqlOpts,
}

/// MySQL connection options.
#[derive(Debug, Clone, Args)]
pub struct MySqlOpts {
    /// MySQL server host
    #[arg(long, default_value = "localhost")]
    pub mysql_host: String,

    /// MySQL server port
    #[arg(long, default_value_t = 3306)]
    pub mysql_port: u16,

    /// MySQL user
    #[arg(long, default_value = "sbtest")]
    pub mysql_user: String,

    /// MySQL password
    #[arg(long, env = "MYSQL_PWD", default_value = "", hide_env_values = true)]
    pub mysql_password: String,

    /// MySQL database name
    #[arg(long, default_value = "sbtest")]
    pub mysql_db: String,
}

/// PostgreSQL connection options.
#[derive(Debug, Clone, Args)]
pub struct PgSqlOpts {
    /// PostgreSQL server host
    #[arg(long, default_value = "localhost")]
    pub pgsql_host: String,

    /// PostgreSQL server port
    #[arg(long, default_value_t = 5432)]
    pub pgsql_port: u16,

    /// PostgreSQL user
    #[arg(long, default_value = "sbtest")]
    pub pgsql_user: String,

    /// PostgreSQL password
    #[arg(long, env = "PGPASSWORD", default_value = "", hide_env_values = true)]
    pub pgsql_password: String,

    /// PostgreSQL database name
    #[arg(long, default_value = "sbtest")]
    pub pgsql_db: String,
}
