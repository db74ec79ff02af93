//! # Route Policies
//!
//! Declarative per-route rate limit settings. A route can opt out of every
//! tier, and then opt individual tiers back in, optionally with a tighter
//! limit or a different window.
//!
//! Resolution per configured tier:
//! 1. a tier-specific override on the route wins
//! 2. otherwise `skip_all` skips the tier
//! 3. otherwise the tier is enforced with its configured defaults
//!
//! Overrides naming a tier that is not configured are ignored.

use std::collections::HashMap;
use std::time::Duration;

use axum::http::Method;

use super::tier::TierConfig;

/// Per-tier setting on a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOverride {
    /// Do not count this tier on the route
    Skip,
    /// Count this tier, replacing the defaults that are given
    Enforce {
        limit: Option<u32>,
        window: Option<Duration>,
    },
}

/// A tier as it applies to one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveTier {
    pub name: String,
    pub limit: u32,
    pub window: Duration,
}

/// Rate limit policy for one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    key: String,
    skip_all: bool,
    overrides: HashMap<String, TierOverride>,
}

impl RoutePolicy {
    /// Policy enforcing every tier at its defaults
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            skip_all: false,
            overrides: HashMap::new(),
        }
    }

    /// Policy exempt from every tier
    pub fn exempt(key: impl Into<String>) -> Self {
        Self::new(key).skip_all()
    }

    /// Opt out of every tier not explicitly re-enabled
    pub fn skip_all(mut self) -> Self {
        self.skip_all = true;
        self
    }

    /// Opt out of one tier
    pub fn skip(mut self, tier: &str) -> Self {
        self.overrides.insert(tier.to_string(), TierOverride::Skip);
        self
    }

    /// Count one tier at its configured defaults
    pub fn enforce(mut self, tier: &str) -> Self {
        self.overrides.insert(
            tier.to_string(),
            TierOverride::Enforce {
                limit: None,
                window: None,
            },
        );
        self
    }

    /// Count one tier with an explicit limit and window
    pub fn throttle(mut self, tier: &str, limit: u32, window: Duration) -> Self {
        self.overrides.insert(
            tier.to_string(),
            TierOverride::Enforce {
                limit: Some(limit),
                window: Some(window),
            },
        );
        self
    }

    /// Key identifying the route in bucket keys
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Tiers this route is counted against, in configured order
    pub fn resolve(&self, tiers: &[TierConfig]) -> Vec<EffectiveTier> {
        tiers
            .iter()
            .filter_map(|tier| match self.overrides.get(&tier.name) {
                Some(TierOverride::Skip) => None,
                Some(TierOverride::Enforce { limit, window }) => Some(EffectiveTier {
                    name: tier.name.clone(),
                    limit: limit.unwrap_or(tier.limit),
                    window: window.unwrap_or_else(|| tier.window()),
                }),
                None if self.skip_all => None,
                None => Some(EffectiveTier {
                    name: tier.name.clone(),
                    limit: tier.limit,
                    window: tier.window(),
                }),
            })
            .collect()
    }
}

/// Policies keyed by method and route path (as declared on the router)
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    routes: HashMap<(Method, String), RoutePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy for a route
    pub fn route(mut self, method: Method, path: &str, policy: RoutePolicy) -> Self {
        self.routes.insert((method, path.to_string()), policy);
        self
    }

    /// Merge another table into this one; entries in `other` win
    pub fn merge(mut self, other: PolicyTable) -> Self {
        self.routes.extend(other.routes);
        self
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<&RoutePolicy> {
        self.routes.get(&(method.clone(), path.to_string()))
    }

    /// Policy for a route, or the global default for routes not in the table
    pub fn policy_for(&self, method: &Method, path: &str) -> RoutePolicy {
        self.lookup(method, path)
            .cloned()
            .unwrap_or_else(|| RoutePolicy::new(format!("{} {}", method, path)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
