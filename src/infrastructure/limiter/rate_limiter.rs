use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// How many requests a single client may make per window.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    pub max_requests: u64,
    pub window: Duration,
    pub message: String,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u64, window: Duration, message: impl Into<String>) -> Self {
        Self {
            max_requests,
            window,
            message: message.into(),
        }
    }
}

/// Outcome of a single check, with enough detail for rate limit headers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub retry_after: Option<Duration>,
}

/// Fixed window counter for one client
#[derive(Debug)]
struct FixedWindow {
    window_start: Instant,
    count: u64,
}

impl FixedWindow {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    fn is_expired(&self, window: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }

    /// Counts the hit and reports whether it fits the policy.
    fn hit(&mut self, policy: &RateLimitPolicy, now: Instant) -> RateLimitDecision {
        if self.is_expired(policy.window, now) {
            self.window_start = now;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        let allowed = self.count <= policy.max_requests;
        let retry_after = if allowed {
            None
        } else {
            Some(
                (self.window_start + policy.window)
                    .saturating_duration_since(now)
                    .max(Duration::from_secs(1)),
            )
        };

        RateLimitDecision {
            allowed,
            limit: policy.max_requests,
            remaining: policy.max_requests.saturating_sub(self.count),
            retry_after,
        }
    }
}

/// --- Rate limiter store & eviction ---
type Key = String;
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<FixedWindow>>>>,
    policy: Arc<RateLimitPolicy>,
}

impl RateLimiterStore {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<FixedWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(FixedWindow::new(now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window = self.get_window(key, now);
        let mut w = window.lock();
        w.hit(&self.policy, now)
    }

    /// Drops every client whose window has fully elapsed. Returns how many
    /// entries were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.map.len();
        let window = self.policy.window;
        self.map.retain(|_, entry| !entry.lock().is_expired(window, now));
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.map.len()
    }
}
