//! Command-line interface and logging setup

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// smsdesk dashboard server command-line interface
#[derive(Parser, Debug)]
#[command(name = "smsdesk-web")]
#[command(about = "Web dashboard for SMS sender-identity requests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable JSON structured logging
    #[arg(long)]
    pub json_logs: bool,

    /// Show timestamps in logs
    #[arg(long, default_value = "true")]
    pub timestamps: bool,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Utility subcommand; without one, the server starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Utility commands for operations and troubleshooting
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the effective configuration
    DumpConfig {
        /// Include the session secret
        #[arg(long)]
        show_sensitive: bool,

        /// Write the effective configuration back to the config file
        #[arg(long)]
        save: bool,
    },

    /// Probe the backend; with credentials, also verify login
    CheckBackend {
        /// Account email (verifies the full login path when given)
        #[arg(long, requires = "password")]
        email: Option<String>,

        /// Account password
        #[arg(long, requires = "email")]
        password: Option<String>,
    },

    /// Log in and stream notification snapshots to the terminal
    Watch {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Poll interval in seconds
        #[arg(short, long, default_value = "10")]
        interval: u64,
    },
}

/// Initialize logging based on CLI configuration
pub fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = cli.log_level.parse::<Level>().with_context(|| {
        format!(
            "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
            cli.log_level
        )
    })?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.as_str()))
        .context("Failed to create log filter")?;

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    match (cli.json_logs, cli.timestamps) {
        (true, true) => subscriber.json().init(),
        (true, false) => subscriber.without_time().json().init(),
        (false, true) => subscriber.init(),
        (false, false) => subscriber.without_time().init(),
    }

    info!(
        "Logging initialized: level={}, json={}, timestamps={}",
        log_level, cli.json_logs, cli.timestamps
    );

    Ok(())
}
