//! Token bucket rate limiter.
//!
//! Each scope (the inbound lookup path, the outbound snapshot fetch) owns a
//! bucket with its own capacity and refill rate. Callers either wait for a
//! token ([`RateLimiter::acquire`]) or are refused immediately
//! ([`RateLimiter::try_acquire`]).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::circuit_breaker::ScopeId;

/// Default rate limit: 60 calls per minute.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Default bucket capacity (allows bursting).
const DEFAULT_BURST_CAPACITY: u32 = 10;

/// Token bucket for a single scope.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    /// Refill rate in tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn from_config(config: &RateLimitConfig) -> Self {
        let capacity = f64::from(config.burst_capacity.max(1));
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: f64::from(config.requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_take(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn wait_time(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Rate limit for one scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained calls per minute.
    pub requests_per_minute: u32,
    /// Maximum burst (bucket capacity).
    pub burst_capacity: u32,
}

impl RateLimitConfig {
    pub fn per_minute(requests_per_minute: u32, burst_capacity: u32) -> Self {
        Self {
            requests_per_minute,
            burst_capacity,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_BURST_CAPACITY)
    }
}

/// Thread-safe token bucket rate limiter keyed by scope.
///
/// Buckets are created lazily from the scope's configuration, or from the
/// default configuration when the scope was never configured.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    configs: Mutex<HashMap<String, RateLimitConfig>>,
}

impl RateLimiter {
    /// Create a new rate limiter with default settings.
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Builder-style variant of [`configure`](Self::configure).
    pub fn with_scope(self, scope: ScopeId, config: RateLimitConfig) -> Self {
        self.configure(&scope, config);
        self
    }

    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_configs(&self) -> MutexGuard<'_, HashMap<String, RateLimitConfig>> {
        self.configs.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter configs mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Configure the limit for a scope, discarding any existing bucket.
    pub fn configure(&self, scope: &ScopeId, config: RateLimitConfig) {
        self.lock_configs().insert(scope.to_string(), config);
        self.lock_buckets().remove(scope.as_ref());
    }

    /// Wait (asynchronously) until a token is available for the scope.
    pub async fn acquire(&self, scope: &ScopeId) {
        loop {
            let wait = {
                let mut buckets = self.lock_buckets();
                let bucket = buckets
                    .entry(scope.to_string())
                    .or_insert_with(|| self.create_bucket(scope));

                if bucket.try_take() {
                    debug!("Rate limiter: acquired token for '{}'", scope);
                    return;
                }
                bucket.wait_time()
            };

            if wait > Duration::ZERO {
                debug!("Rate limiter: waiting {:?} for '{}'", wait, scope);
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Take a token without waiting. Returns false when the scope is over its limit.
    pub fn try_acquire(&self, scope: &ScopeId) -> bool {
        let mut buckets = self.lock_buckets();
        let bucket = buckets
            .entry(scope.to_string())
            .or_insert_with(|| self.create_bucket(scope));

        let acquired = bucket.try_take();
        if !acquired {
            debug!("Rate limiter: rejected call for '{}'", scope);
        }
        acquired
    }

    /// Tokens currently available for the scope.
    pub fn remaining_tokens(&self, scope: &ScopeId) -> f64 {
        let mut buckets = self.lock_buckets();

        match buckets.get_mut(scope.as_ref()) {
            Some(bucket) => {
                bucket.refill();
                bucket.tokens
            }
            None => f64::from(self.config_for(scope).burst_capacity.max(1)),
        }
    }

    /// Refill the scope's bucket to capacity.
    pub fn reset(&self, scope: &ScopeId) {
        self.lock_buckets().remove(scope.as_ref());
    }

    fn config_for(&self, scope: &ScopeId) -> RateLimitConfig {
        self.lock_configs()
            .get(scope.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    fn create_bucket(&self, scope: &ScopeId) -> TokenBucket {
        TokenBucket::from_config(&self.config_for(scope))
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_bucket_drains_to_zero() {
        let mut bucket = TokenBucket::from_config(&RateLimitConfig::default());

        for _ in 0..DEFAULT_BURST_CAPACITY {
            assert!(bucket.try_take());
        }
        assert!(!bucket.try_take());
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::from_config(&RateLimitConfig::per_minute(60, 1));

        assert!(bucket.try_take());
        assert!(!bucket.try_take());

        bucket.last_update = Instant::now() - Duration::from_secs(2);
        assert!(bucket.try_take());
    }

    #[test]
    fn test_unconfigured_scope_uses_defaults() {
        let limiter = RateLimiter::new();
        let scope: ScopeId = Cow::Borrowed("DEFAULT_SCOPE");

        for _ in 0..DEFAULT_BURST_CAPACITY {
            assert!(limiter.try_acquire(&scope));
        }
        assert!(!limiter.try_acquire(&scope));
    }

    #[test]
    fn test_configured_scope_respects_burst() {
        let scope: ScopeId = Cow::Borrowed("LOOKUP");
        let limiter =
            RateLimiter::new().with_scope(scope.clone(), RateLimitConfig::per_minute(120, 3));

        for _ in 0..3 {
            assert!(limiter.try_acquire(&scope));
        }
        assert!(!limiter.try_acquire(&scope));
    }

    #[test]
    fn test_scope_isolation() {
        let limiter = RateLimiter::new();
        let a: ScopeId = Cow::Borrowed("SCOPE_A");
        let b: ScopeId = Cow::Borrowed("SCOPE_B");

        for _ in 0..DEFAULT_BURST_CAPACITY {
            limiter.try_acquire(&a);
        }
        assert!(!limiter.try_acquire(&a));
        assert!(limiter.try_acquire(&b));
    }

    #[test]
    fn test_reset_restores_capacity() {
        let limiter = RateLimiter::new();
        let scope: ScopeId = Cow::Borrowed("RESET_SCOPE");

        for _ in 0..DEFAULT_BURST_CAPACITY {
            limiter.try_acquire(&scope);
        }
        assert!(!limiter.try_acquire(&scope));

        limiter.reset(&scope);
        assert!(limiter.try_acquire(&scope));
    }

    #[test]
    fn test_remaining_tokens_reflects_configuration() {
        let scope: ScopeId = Cow::Borrowed("REMAINING");
        let limiter =
            RateLimiter::new().with_scope(scope.clone(), RateLimitConfig::per_minute(1, 5));

        assert!((limiter.remaining_tokens(&scope) - 5.0).abs() < 0.01);

        limiter.try_acquire(&scope);
        limiter.try_acquire(&scope);
        assert!((limiter.remaining_tokens(&scope) - 3.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_async_acquire_waits_for_refill() {
        let scope: ScopeId = Cow::Borrowed("ASYNC_SCOPE");
        let limiter =
            RateLimiter::new().with_scope(scope.clone(), RateLimitConfig::per_minute(6000, 2));

        limiter.acquire(&scope).await;
        limiter.acquire(&scope).await;

        let start = Instant::now();
        limiter.acquire(&scope).await;
        assert!(start.elapsed().as_millis() >= 5);
    }
}
