//! CLI argument definitions using clap
//!
//! Commands:
//! - secureguard serve [--config <path>] [--host <host>] [--port <port>]
//! - secureguard check-config [--config <path>]
//! - secureguard status

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SecureGuard - remote access hardening dashboard service
#[derive(Parser, Debug)]
#[command(name = "secureguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dashboard HTTP API
    Serve {
        /// Path to configuration file (default: ./secureguard.json if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration and print the effective values
    CheckConfig {
        /// Path to configuration file (default: ./secureguard.json if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the aggregate status of a freshly seeded store
    Status,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
