//! Rate Limiter
//!
//! Caps how often one sender can push estimates through the relay.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;

struct TokenBucket {
    tokens: u32,
    max_tokens: u32,
    last_refill: Instant,
    last_seen: Instant,
    refill_every: Duration,
}

impl TokenBucket {
    fn new(max_tokens: u32, refill_every: Duration) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            last_refill: Instant::now(),
            last_seen: Instant::now(),
            refill_every,
        }
    }

    fn try_consume(&mut self) -> bool {
        self.last_seen = Instant::now();
        self.refill();
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let elapsed = self.last_refill.elapsed();
        let refills = (elapsed.as_secs_f64() / self.refill_every.as_secs_f64()) as u32;

        if refills > 0 {
            self.tokens = (self.tokens + refills).min(self.max_tokens);
            self.last_refill = Instant::now();
        }
    }
}

pub const DEFAULT_MAX_KEYS: usize = 10_000;

/// Token bucket per key (the submitter's email address).
///
/// A bucket untouched for a whole window is back to full, so it is dropped
/// on the next sweep. When `max_keys` senders are tracked at once, new keys
/// are refused until a sweep frees room.
pub struct RateLimiter {
    buckets: HashMap<String, TokenBucket>,
    per_window: u32,
    window: Duration,
    max_keys: usize,
    last_sweep: Instant,
}

impl RateLimiter {
    /// Allow `per_window` sends per key per `window`, refilled evenly.
    pub fn new(per_window: u32, window: Duration) -> Self {
        Self {
            buckets: HashMap::new(),
            per_window: per_window.max(1),
            window,
            max_keys: DEFAULT_MAX_KEYS,
            last_sweep: Instant::now(),
        }
    }

    pub fn per_minute(per_minute: u32) -> Self {
        Self::new(per_minute, Duration::from_secs(60))
    }

    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.max(1);
        self
    }

    pub fn check(&mut self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        if !self.buckets.contains_key(&key) {
            if self.buckets.len() >= self.max_keys || self.last_sweep.elapsed() >= self.window {
                self.sweep();
            }
            if self.buckets.len() >= self.max_keys {
                warn!(tracked = self.buckets.len(), "rate limiter full; refusing new sender");
                return false;
            }
        }

        let refill_every = self.window / self.per_window;
        let per_window = self.per_window;
        self.buckets
            .entry(key)
            .or_insert_with(|| TokenBucket::new(per_window, refill_every))
            .try_consume()
    }

    /// Drop buckets idle for at least one window.
    fn sweep(&mut self) {
        let window = self.window;
        self.buckets.retain(|_, bucket| bucket.last_seen.elapsed() < window);
        self.last_sweep = Instant::now();
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }

    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(5)
    }
}
