//! Service configuration file
//!
//! A single JSON document; every section and field is optional and falls
//! back to its default. Validation runs after load.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::errors::{CliError, CliResult};
use crate::employees::{
    EmployeeRepository, InMemoryEmployeeRepository, JsonFileEmployeeRepository, StoreResult,
};
use crate::http_server::HttpServerConfig;
use crate::observability::LogConfig;
use crate::rate_limit::RateLimitConfig;

/// Employee store selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON data file. `None` keeps employees in memory only.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

impl StorageConfig {
    /// Open the configured repository
    pub fn open(&self) -> StoreResult<Arc<dyn EmployeeRepository>> {
        Ok(match &self.data_file {
            Some(path) => Arc::new(JsonFileEmployeeRepository::open(path)?),
            None => Arc::new(InMemoryEmployeeRepository::new()),
        })
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Load configuration from file, or use defaults if the file is absent
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.http.host.trim().is_empty() {
            return Err(CliError::Config("http.host must not be empty".to_string()));
        }

        self.rate_limit
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        EnvFilter::try_new(&self.log.filter).map_err(|e| {
            CliError::Config(format!("invalid log filter '{}': {}", self.log.filter, e))
        })?;

        Ok(())
    }
}
