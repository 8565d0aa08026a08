use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::sleep;

/// Token bucket with fractional refill.
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64, now: Instant) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            self.last_refill = now;
        }
    }

    fn try_consume(&mut self, now: Instant) -> bool {
        self.refill(now);
        // epsilon for accumulated float error
        if self.tokens + 1e-9 >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn seconds_until_token(&self) -> u64 {
        let missing = (1.0 - self.tokens).max(0.0);
        ((missing / self.refill_per_sec).ceil() as u64).max(1)
    }
}

/// Weighted two-window counter.
#[derive(Debug)]
struct SlidingWindow {
    window: Duration,
    limit: u64,
    window_start: Instant,
    current: u64,
    previous: u64,
}

impl SlidingWindow {
    fn new(window: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window,
            limit,
            window_start: now,
            current: 0,
            previous: 0,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window * 2 {
            self.previous = 0;
            self.current = 0;
            self.window_start = now;
        } else if elapsed >= self.window {
            self.previous = self.current;
            self.current = 0;
            self.window_start += self.window;
        }
    }

    fn effective(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.window_start).as_secs_f64();
        let weight = (elapsed / self.window.as_secs_f64()).min(1.0);
        self.previous as f64 * (1.0 - weight) + self.current as f64
    }

    fn record(&mut self) {
        self.current += 1;
    }

    fn seconds_until_window_moves(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.window_start);
        self.window.saturating_sub(elapsed).as_secs().max(1)
    }
}

/// Limits for one class of requests.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Burst size of the token bucket.
    pub burst: u64,
    /// Requests allowed per `window`.
    pub limit: u64,
    pub window: Duration,
    /// Idle keys are evicted after this long.
    pub idle_ttl: Duration,
}

impl RateLimitPolicy {
    pub fn per_minute(limit: u64) -> Self {
        let limit = limit.max(1);
        RateLimitPolicy {
            burst: limit,
            limit,
            window: Duration::from_secs(60),
            idle_ttl: Duration::from_secs(10 * 60),
        }
    }

    fn refill_per_sec(&self) -> f64 {
        self.limit as f64 / self.window.as_secs_f64()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub retry_after: Option<u64>,
}

/// A request must pass both the bucket and the window.
#[derive(Debug)]
struct HybridLimiter {
    bucket: TokenBucket,
    window: SlidingWindow,
    last_seen: Instant,
}

impl HybridLimiter {
    fn new(policy: &RateLimitPolicy, now: Instant) -> Self {
        Self {
            bucket: TokenBucket::new(policy.burst as f64, policy.refill_per_sec(), now),
            window: SlidingWindow::new(policy.window, policy.limit, now),
            last_seen: now,
        }
    }

    fn check(&mut self, now: Instant) -> RateDecision {
        self.last_seen = now;
        self.window.roll(now);

        if self.window.effective(now) + 1.0 > self.window.limit as f64 {
            return RateDecision {
                allowed: false,
                retry_after: Some(self.window.seconds_until_window_moves(now)),
            };
        }

        if !self.bucket.try_consume(now) {
            return RateDecision {
                allowed: false,
                retry_after: Some(self.bucket.seconds_until_token()),
            };
        }

        self.window.record();
        RateDecision { allowed: true, retry_after: None }
    }
}

/// Per-key limiter store shared across workers.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<String, Arc<Mutex<HybridLimiter>>>>,
    policy: RateLimitPolicy,
}

impl RateLimiterStore {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            policy,
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let limiter = self
            .map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HybridLimiter::new(&self.policy, now))))
            .clone();

        let mut limiter = limiter.lock();
        limiter.check(now)
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }

    /// Drops keys idle for longer than the policy's TTL.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let ttl = self.policy.idle_ttl;
        let before = self.map.len();
        self.map
            .retain(|_, limiter| now.saturating_duration_since(limiter.lock().last_seen) <= ttl);
        before.saturating_sub(self.map.len())
    }

    /// Runs `evict_idle` every 30 seconds until the runtime shuts down.
    pub fn spawn_eviction(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(30)).await;
                let evicted = store.evict_idle();
                if evicted > 0 {
                    tracing::debug!(evicted, "Evicted idle rate limiter keys");
                }
            }
        });
    }
}
