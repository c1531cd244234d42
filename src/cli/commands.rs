//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_json;
use crate::control::ControlApi;
use crate::http_server::HttpServer;
use crate::observability::Logger;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, host, port } => serve(config.as_deref(), host, port),
        Command::CheckConfig { config } => check_config(config.as_deref()),
        Command::Status => status(),
    }
}

/// Effective configuration after command-line overrides
pub fn effective_config(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> CliResult<Config> {
    let mut config = Config::resolve(config_path)?;
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }
    config.validate()?;
    Ok(config)
}

/// Start the dashboard HTTP API and serve until stopped
pub fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> CliResult<()> {
    let config = effective_config(config_path, host, port)?;
    Logger::set_quiet(config.quiet_logs);

    let changer = config.build_changer();
    Logger::info("SYSTEM_CHANGER_SELECTED", &[("changer", changer.name())]);

    let api = Arc::new(ControlApi::with_changer(changer));
    let server = HttpServer::with_config(config.http.clone(), api);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate the configuration and print it
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = effective_config(config_path, None, None)?;
    write_json(&config)
}

/// Print the aggregate status of the seeded defaults
pub fn status() -> CliResult<()> {
    let api = ControlApi::new();
    let status = api
        .status()
        .map_err(|e| CliError::io_error(format!("Failed to compute status: {}", e)))?;
    write_json(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_apply() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"http": {"port": 6000}}"#).unwrap();

        let config =
            effective_config(Some(file.path()), Some("0.0.0.0".to_string()), Some(6100)).unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 6100);
    }

    #[test]
    fn test_empty_host_override_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();

        assert!(effective_config(Some(file.path()), Some(" ".to_string()), None).is_err());
    }
}
