//! # Rate Limit Tiers
//!
//! A tier is a named window/limit pair. Every route is counted against every
//! configured tier unless its policy says otherwise.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{RateLimitError, RateLimitResult};

pub const SHORT: &str = "short";
pub const LONG: &str = "long";

/// One named tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub name: String,

    /// Window length in milliseconds
    pub window_ms: u64,

    /// Requests allowed per window
    pub limit: u32,
}

impl TierConfig {
    pub fn new(name: impl Into<String>, window_ms: u64, limit: u32) -> Self {
        Self {
            name: name.into(),
            window_ms,
            limit,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Global tiers, checked in order (default: short 3/1s, long 100/60s)
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierConfig>,

    /// Take the client identity from `X-Forwarded-For` (default: false)
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// How often expired buckets are dropped (default: 60000)
    #[serde(default = "default_purge_interval_ms")]
    pub purge_interval_ms: u64,
}

fn default_tiers() -> Vec<TierConfig> {
    vec![
        TierConfig::new(SHORT, 1_000, 3),
        TierConfig::new(LONG, 60_000, 100),
    ]
}

fn default_purge_interval_ms() -> u64 {
    60_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            trust_forwarded_for: false,
            purge_interval_ms: default_purge_interval_ms(),
        }
    }
}

impl RateLimitConfig {
    /// Validate tier definitions.
    ///
    /// Tier names end up in response header names, so they are restricted to
    /// lowercase ASCII letters, digits, `-` and `_`.
    pub fn validate(&self) -> RateLimitResult<()> {
        if self.tiers.is_empty() {
            return Err(RateLimitError::InvalidConfig(
                "at least one tier is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for tier in &self.tiers {
            let valid_name = !tier.name.is_empty()
                && tier
                    .name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
            if !valid_name {
                return Err(RateLimitError::InvalidConfig(format!(
                    "invalid tier name '{}'",
                    tier.name
                )));
            }
            if !seen.insert(tier.name.as_str()) {
                return Err(RateLimitError::InvalidConfig(format!(
                    "duplicate tier '{}'",
                    tier.name
                )));
            }
            if tier.window_ms == 0 {
                return Err(RateLimitError::InvalidConfig(format!(
                    "tier '{}' window_ms must be > 0",
                    tier.name
                )));
            }
            if tier.limit == 0 {
                return Err(RateLimitError::InvalidConfig(format!(
                    "tier '{}' limit must be > 0",
                    tier.name
                )));
            }
        }

        if self.purge_interval_ms == 0 {
            return Err(RateLimitError::InvalidConfig(
                "purge_interval_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_millis(self.purge_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let config = RateLimitConfig::default();
        assert_eq!(config.tiers[0], TierConfig::new("short", 1000, 3));
        assert_eq!(config.tiers[1], TierConfig::new("long", 60000, 100));
        assert!(config.validate().is_ok());
        assert_eq!(config.purge_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: RateLimitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.tiers.len(), 2);
        assert!(!config.trust_forwarded_for);
        assert_eq!(config.purge_interval_ms, 60_000);
    }

    #[test]
    fn test_rejects_bad_tiers() {
        let mut config = RateLimitConfig::default();
        config.tiers.push(TierConfig::new("short", 10, 1));
        assert!(config.validate().is_err());

        let config = RateLimitConfig {
            tiers: vec![TierConfig::new("burst", 0, 1)],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RateLimitConfig {
            tiers: vec![TierConfig::new("burst", 10, 0)],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RateLimitConfig {
            tiers: vec![TierConfig::new("Has Space", 10, 1)],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RateLimitConfig {
            tiers: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
