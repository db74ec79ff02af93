//! # Fixed Window Limiter
//!
//! One counter per (client, route key, tier). A window opens on the first
//! hit of a bucket and closes `window` later; the next hit after that opens
//! a fresh window. All buckets sit behind one mutex so concurrent hits from
//! the same client never undercount.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use super::errors::{RateLimitError, RateLimitResult};
use super::policy::RoutePolicy;
use super::tier::TierConfig;

/// Identifies one counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub client: String,
    pub route: String,
    pub tier: String,
}

impl BucketKey {
    pub fn new(client: &str, route: &str, tier: &str) -> Self {
        Self {
            client: client.to_string(),
            route: route.to_string(),
            tier: tier.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    length: Duration,
    hits: u32,
}

/// Outcome of counting one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    /// Hits in the current window, including this one
    pub hits: u32,
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
}

/// Fixed-window counters
#[derive(Debug)]
pub struct FixedWindowLimiter {
    clock: Arc<dyn Clock>,
    buckets: Mutex<HashMap<BucketKey, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Count a hit against a bucket and decide whether it is allowed
    pub fn hit(&self, key: BucketKey, limit: u32, window: Duration) -> RateLimitResult<Decision> {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().map_err(|_| RateLimitError::Poisoned)?;

        let entry = buckets.entry(key).or_insert(Window {
            started: now,
            length: window,
            hits: 0,
        });

        if now.saturating_duration_since(entry.started) >= window {
            entry.started = now;
            entry.hits = 0;
        }
        entry.length = window;
        entry.hits = entry.hits.saturating_add(1);

        let elapsed = now.saturating_duration_since(entry.started);
        Ok(Decision {
            allowed: entry.hits <= limit,
            limit,
            hits: entry.hits,
            remaining: limit.saturating_sub(entry.hits),
            reset_after: window.saturating_sub(elapsed),
        })
    }

    /// Drop buckets whose window has closed. Returns how many were removed.
    pub fn purge_expired(&self) -> RateLimitResult<usize> {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().map_err(|_| RateLimitError::Poisoned)?;

        let before = buckets.len();
        buckets.retain(|_, w| now.saturating_duration_since(w.started) < w.length);
        Ok(before - buckets.len())
    }

    pub fn bucket_count(&self) -> RateLimitResult<usize> {
        let buckets = self.buckets.lock().map_err(|_| RateLimitError::Poisoned)?;
        Ok(buckets.len())
    }
}

/// Result of one tier check on a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierOutcome {
    pub tier: String,
    pub decision: Decision,
}

/// Result of checking every effective tier of a route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub outcomes: Vec<TierOutcome>,
}

impl Verdict {
    /// The tier that rejected the request, if any
    pub fn rejected(&self) -> Option<&TierOutcome> {
        self.outcomes.iter().find(|o| !o.decision.allowed)
    }

    pub fn is_allowed(&self) -> bool {
        self.rejected().is_none()
    }
}

/// Applies route policies against the configured tiers
#[derive(Debug)]
pub struct RateLimiter {
    tiers: Vec<TierConfig>,
    limiter: FixedWindowLimiter,
}

impl RateLimiter {
    pub fn new(tiers: Vec<TierConfig>) -> Self {
        Self::with_clock(tiers, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(tiers: Vec<TierConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tiers,
            limiter: FixedWindowLimiter::new(clock),
        }
    }

    pub fn tiers(&self) -> &[TierConfig] {
        &self.tiers
    }

    /// Count a request from `client` on a route.
    ///
    /// Tiers are checked in configured order and checking stops at the first
    /// tier that rejects, so later tiers are not charged for a refused request.
    pub fn check(&self, client: &str, policy: &RoutePolicy) -> RateLimitResult<Verdict> {
        let mut verdict = Verdict::default();

        for tier in policy.resolve(&self.tiers) {
            let key = BucketKey::new(client, policy.key(), &tier.name);
            let decision = self.limiter.hit(key, tier.limit, tier.window)?;
            let allowed = decision.allowed;

            verdict.outcomes.push(TierOutcome {
                tier: tier.name,
                decision,
            });

            if !allowed {
                break;
            }
        }

        Ok(verdict)
    }

    /// Drop expired buckets
    pub fn purge_expired(&self) -> RateLimitResult<usize> {
        self.limiter.purge_expired()
    }

    pub fn bucket_count(&self) -> RateLimitResult<usize> {
        self.limiter.bucket_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::clock::MockClock;
    use crate::rate_limit::tier::{RateLimitConfig, LONG, SHORT};

    fn limiter() -> (MockClock, FixedWindowLimiter) {
        let clock = MockClock::default();
        let limiter = FixedWindowLimiter::new(Arc::new(clock.clone()));
        (clock, limiter)
    }

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let (_clock, limiter) = limiter();
        let key = BucketKey::new("10.0.0.1", "r", SHORT);

        for expected_remaining in [2, 1, 0] {
            let d = limiter.hit(key.clone(), 3, Duration::from_secs(1)).unwrap();
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }

        let d = limiter.hit(key, 3, Duration::from_secs(1)).unwrap();
        assert!(!d.allowed);
        assert_eq!(d.hits, 4);
        assert_eq!(d.remaining, 0);
    }

    #[test]
    fn test_window_rolls_over() {
        let (clock, limiter) = limiter();
        let key = BucketKey::new("c", "r", SHORT);
        let window = Duration::from_millis(1000);

        assert!(limiter.hit(key.clone(), 1, window).unwrap().allowed);
        clock.advance(Duration::from_millis(400));
        let blocked = limiter.hit(key.clone(), 1, window).unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.reset_after, Duration::from_millis(600));

        clock.advance(Duration::from_millis(600));
        let fresh = limiter.hit(key, 1, window).unwrap();
        assert!(fresh.allowed);
        assert_eq!(fresh.hits, 1);
        assert_eq!(fresh.reset_after, window);
    }

    #[test]
    fn test_buckets_are_independent() {
        let (_clock, limiter) = limiter();
        let window = Duration::from_secs(1);

        assert!(limiter.hit(BucketKey::new("a", "r", SHORT), 1, window).unwrap().allowed);
        assert!(limiter.hit(BucketKey::new("b", "r", SHORT), 1, window).unwrap().allowed);
        assert!(limiter.hit(BucketKey::new("a", "other", SHORT), 1, window).unwrap().allowed);
        assert!(limiter.hit(BucketKey::new("a", "r", LONG), 1, window).unwrap().allowed);
        assert!(!limiter.hit(BucketKey::new("a", "r", SHORT), 1, window).unwrap().allowed);
    }

    #[test]
    fn test_purge_expired() {
        let (clock, limiter) = limiter();
        limiter.hit(BucketKey::new("a", "r", SHORT), 3, Duration::from_secs(1)).unwrap();
        limiter.hit(BucketKey::new("a", "r", LONG), 3, Duration::from_secs(60)).unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(limiter.purge_expired().unwrap(), 1);
        assert_eq!(limiter.bucket_count().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_hits_are_all_counted() {
        let limiter = Arc::new(FixedWindowLimiter::new(Arc::new(MockClock::default())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        limiter
                            .hit(BucketKey::new("c", "r", LONG), 1000, Duration::from_secs(60))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let d = limiter
            .hit(BucketKey::new("c", "r", LONG), 1000, Duration::from_secs(60))
            .unwrap();
        assert_eq!(d.hits, 201);
    }

    #[test]
    fn test_check_stops_at_first_rejecting_tier() {
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default().tiers,
            Arc::new(MockClock::default()),
        );
        let policy = RoutePolicy::new("r");

        for _ in 0..3 {
            assert!(limiter.check("c", &policy).unwrap().is_allowed());
        }

        let verdict = limiter.check("c", &policy).unwrap();
        let rejected = verdict.rejected().unwrap();
        assert_eq!(rejected.tier, SHORT);
        // long tier was not charged for the refused request
        assert_eq!(verdict.outcomes.len(), 1);

        // Only the three allowed requests were charged to the long tier
        let long_only = RoutePolicy::new("r").skip(SHORT);
        let verdict = limiter.check("c", &long_only).unwrap();
        assert_eq!(verdict.outcomes[0].tier, LONG);
        assert_eq!(verdict.outcomes[0].decision.hits, 4);
    }

    #[test]
    fn test_exempt_route_is_never_counted() {
        let limiter = RateLimiter::with_clock(
            RateLimitConfig::default().tiers,
            Arc::new(MockClock::default()),
        );
        let policy = RoutePolicy::exempt("create");

        for _ in 0..500 {
            let verdict = limiter.check("c", &policy).unwrap();
            assert!(verdict.is_allowed());
            assert!(verdict.outcomes.is_empty());
        }
        assert_eq!(limiter.bucket_count().unwrap(), 0);
    }
}
