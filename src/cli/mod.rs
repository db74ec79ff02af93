//! CLI module for the employee service
//!
//! Provides command-line interface for:
//! - init: Write a default configuration file
//! - start: Boot the service and serve HTTP
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, init, run, run_command, start};
pub use config::{Config, StorageConfig};
pub use errors::{CliError, CliResult};
