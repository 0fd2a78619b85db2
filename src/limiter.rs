//! Sliding-window conversion quota for guest callers.
//!
//! Guests get a fixed number of conversions per window, tracked per client
//! address in process memory. Logged-in callers bypass the limiter entirely.
//! State is per-process: a multi-instance deployment gives each instance its
//! own quota, and restarts reset it. Acceptable for this tier.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

/// Conversions a guest may run inside one window.
pub const GUEST_LIMIT: usize = 2;

/// Window length: six hours, in milliseconds.
pub const GUEST_WINDOW_MS: i64 = 6 * 60 * 60 * 1000;

/// Message shown when the guest quota is exhausted. User-facing code and the
/// error taxonomy both key off the "exceeded the limit" substring.
pub const QUOTA_MESSAGE: &str = "You have exceeded the limit of 2 conversions per 6 hours for \
     guest users. Please sign in or upgrade to Pro for unlimited conversions.";

/// Bucket used when no client address is available. All such callers share
/// one quota.
pub const FALLBACK_CLIENT_ID: &str = "127.0.0.1";

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Conversions left in the current window. Never underflows.
    pub remaining: usize,
}

/// Quota backend, injected so callers can swap the storage (and tests can
/// substitute a permissive or exhausted one).
pub trait RateLimiter: Send + Sync {
    /// Report whether `client_id` may run another conversion. Prunes expired
    /// timestamps as a side effect, so repeated checks stay cheap.
    fn check(&self, client_id: &str) -> RateLimitDecision;

    /// Record one successful conversion for `client_id`. No-op once the
    /// quota is full; callers must gate on [`check`](Self::check) first.
    fn record(&self, client_id: &str);
}

/// Derive the limiter bucket from a forwarded client address. Proxies send
/// comma-separated chains; the first hop is the original client.
pub fn client_id(forwarded_for: Option<&str>) -> String {
    forwarded_for
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_CLIENT_ID)
        .to_string()
}

/// In-memory sliding-window limiter: per-client vectors of epoch-millis
/// timestamps behind a single mutex. Prune and append happen under one lock
/// acquisition so concurrent checks cannot double-spend the quota.
pub struct InMemoryRateLimiter {
    limit: usize,
    window_ms: i64,
    buckets: Mutex<HashMap<String, Vec<i64>>>,
}

impl InMemoryRateLimiter {
    /// Limiter with the guest defaults (2 conversions per 6 hours).
    pub fn new() -> Self {
        Self::with_limits(GUEST_LIMIT, GUEST_WINDOW_MS)
    }

    pub fn with_limits(limit: usize, window_ms: i64) -> Self {
        Self {
            limit,
            window_ms,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// `check` against an explicit clock. Lock poisoning is unrecoverable
    /// state corruption, so a poisoned mutex fails closed (quota denied).
    pub fn check_at(&self, client_id: &str, now_ms: i64) -> RateLimitDecision {
        let Ok(mut buckets) = self.buckets.lock() else {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
            };
        };
        let timestamps = buckets.entry(client_id.to_string()).or_default();
        timestamps.retain(|&ts| now_ms - ts < self.window_ms);
        let used = timestamps.len();
        RateLimitDecision {
            allowed: used < self.limit,
            remaining: self.limit.saturating_sub(used),
        }
    }

    /// `record` against an explicit clock.
    pub fn record_at(&self, client_id: &str, now_ms: i64) {
        let Ok(mut buckets) = self.buckets.lock() else {
            return;
        };
        let timestamps = buckets.entry(client_id.to_string()).or_default();
        timestamps.retain(|&ts| now_ms - ts < self.window_ms);
        if timestamps.len() < self.limit {
            timestamps.push(now_ms);
        } else {
            tracing::warn!(client_id, "record called with quota already full");
        }
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, client_id: &str) -> RateLimitDecision {
        self.check_at(client_id, Self::now_ms())
    }

    fn record(&self, client_id: &str) {
        self.record_at(client_id, Self::now_ms())
    }
}
