//! Configuration file
//!
//! A JSON document; every field has a default, so an empty object (or no
//! file at the default path) is a valid configuration.
//!
//! ```json
//! {
//!   "http": { "host": "127.0.0.1", "port": 5000, "cors_origins": [] },
//!   "system_changes": { "mode": "command", "program": "C:\\secureguard\\apply.cmd", "args": [] },
//!   "quiet_logs": false
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::control::{CommandSystemChanger, NoopSystemChanger, SystemChanger};
use crate::http_server::HttpServerConfig;

/// Looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./secureguard.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemChangeMode {
    /// Leave the host untouched
    #[default]
    Noop,
    /// Spawn `program` for every change
    Command,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemChangeConfig {
    #[serde(default)]
    pub mode: SystemChangeMode,

    /// Program to spawn in `command` mode
    #[serde(default)]
    pub program: Option<String>,

    /// Arguments placed before `<kind> <target> <state>`
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub system_changes: SystemChangeConfig,

    /// Suppress INFO log lines
    #[serde(default)]
    pub quiet_logs: bool,
}

impl Config {
    /// Load an explicit config file, or the default one if it exists
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.http.host.trim().is_empty() {
            return Err(CliError::config_error("http.host must not be empty"));
        }

        for origin in &self.http.cors_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(CliError::config_error(format!(
                    "Invalid CORS origin: '{}'. Expected an http:// or https:// origin.",
                    origin
                )));
            }
        }

        if self.system_changes.mode == SystemChangeMode::Command {
            let has_program = self
                .system_changes
                .program
                .as_deref()
                .map(|p| !p.trim().is_empty())
                .unwrap_or(false);
            if !has_program {
                return Err(CliError::config_error(
                    "system_changes.program is required when mode is 'command'",
                ));
            }
        }

        Ok(())
    }

    /// Collaborator selected by `system_changes.mode`
    pub fn build_changer(&self) -> Arc<dyn SystemChanger> {
        match (&self.system_changes.mode, &self.system_changes.program) {
            (SystemChangeMode::Command, Some(program)) => Arc::new(CommandSystemChanger::new(
                program.clone(),
                self.system_changes.args.clone(),
            )),
            _ => Arc::new(NoopSystemChanger),
        }
    }
}
