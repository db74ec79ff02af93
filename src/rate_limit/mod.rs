//! # Rate Limiting
//!
//! Per-client request throttling with named tiers and per-route policies.
//!
//! - [`TierConfig`] / [`RateLimitConfig`]: global tiers (`short`, `long`)
//! - [`RoutePolicy`] / [`PolicyTable`]: route exemptions and overrides
//! - [`FixedWindowLimiter`]: counters keyed by (client, route, tier)
//! - [`RateLimiter`]: resolves a route policy and charges each tier
//!
//! The axum middleware that applies this to requests lives in
//! `http_server::throttle`.

pub mod clock;
pub mod errors;
pub mod limiter;
pub mod policy;
pub mod tier;

pub use clock::{Clock, MockClock, SystemClock};
pub use errors::{RateLimitError, RateLimitResult};
pub use limiter::{BucketKey, Decision, FixedWindowLimiter, RateLimiter, TierOutcome, Verdict};
pub use policy::{EffectiveTier, PolicyTable, RoutePolicy, TierOverride};
pub use tier::{RateLimitConfig, TierConfig, LONG, SHORT};
