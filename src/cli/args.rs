//! CLI argument definitions using clap
//!
//! Commands:
//! - employee-service init --config <path>
//! - employee-service start --config <path> [--port <port>]
//! - employee-service check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Employee records service with per-route rate limiting
#[derive(Parser, Debug)]
#[command(name = "employee-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./employees.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Start {
        /// Path to configuration file (defaults are used if it does not exist)
        #[arg(long, default_value = "./employees.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate a configuration file, then print the effective config
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./employees.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
