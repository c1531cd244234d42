//! CLI module for SecureGuard
//!
//! Provides command-line interface for:
//! - serve: Run the dashboard HTTP API
//! - check-config: Validate and print the effective configuration
//! - status: Print the seeded aggregate status

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, effective_config, run, run_command, serve, status};
pub use config::{Config, SystemChangeConfig, SystemChangeMode, DEFAULT_CONFIG_PATH};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;
