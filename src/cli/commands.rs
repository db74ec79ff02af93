//! CLI command implementations
//!
//! `start` boot sequence:
//! 1. Configuration load and validation
//! 2. Logging setup
//! 3. Store open
//! 4. HTTP server start (serves until Ctrl+C / SIGTERM)

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::employees::EmployeeService;
use crate::http_server::HttpServer;
use crate::observability::{init_tracing, log_event, Event};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config, port } => start(&config, port),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Write a default configuration file. Refuses to overwrite an existing one.
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::AlreadyInitialized(config_path.to_path_buf()));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::Config(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
    }

    let content = serde_json::to_string_pretty(&Config::default())?;
    fs::write(config_path, content)?;

    write_response(json!({
        "initialized": true,
        "config": config_path.display().to_string(),
    }))
}

/// Load, validate and print the effective configuration
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    write_response(serde_json::to_value(&config)?)
}

/// Boot the service and serve HTTP until shutdown
pub fn start(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    init_tracing(&config.log).map_err(|e| CliError::BootFailed(e.to_string()))?;

    let config_display = config_path.display().to_string();
    log_event(Event::BootStart, &[("config", config_display.as_str())]);
    log_event(Event::ConfigLoaded, &[("addr", config.http.socket_addr().as_str())]);

    let repository = config.storage.open().map_err(|e| {
        let reason = e.to_string();
        log_event(Event::BootFailed, &[("reason", reason.as_str())]);
        CliError::BootFailed(format!("Failed to open store: {}", e))
    })?;
    let store = config
        .storage
        .data_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "memory".to_string());
    log_event(Event::StoreOpened, &[("store", store.as_str())]);

    let server = HttpServer::new(
        config.http.clone(),
        EmployeeService::new(repository),
        &config.rate_limit,
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::BootFailed(format!("Failed to create tokio runtime: {}", e)))?;

    log_event(Event::BootComplete, &[]);
    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::BootFailed(format!("HTTP server failed: {}", e)))
    })?;
    log_event(Event::ShutdownComplete, &[]);

    Ok(())
}
