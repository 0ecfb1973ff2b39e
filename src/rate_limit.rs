use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::debug;

use crate::metrics::TRACKED_CLIENTS;

// Rate limit state - tracks requests per client identifier
#[derive(Debug, Clone, Copy)]
pub struct ClientRateState {
    pub count: u32,
    pub window_start: Instant,
}

/// Admission check keyed by client identifier. `now` is supplied by the caller.
pub trait RateLimiter: Send + Sync {
    /// Records one request from `client` and reports whether it is allowed.
    fn check(&self, client: &str, now: Instant) -> bool;

    /// Drops state that can no longer influence a decision. Returns how many
    /// records were removed.
    fn sweep(&self, now: Instant) -> usize;

    fn tracked_clients(&self) -> usize;
}

// Fixed-window counter over an in-process map. Best effort, single instance only
pub struct FixedWindowLimiter {
    clients: DashMap<String, ClientRateState>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            clients: DashMap::new(),
            max_requests,
            window,
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, client: &str, now: Instant) -> bool {
        // the entry guard holds the shard lock, so read-modify-write is atomic per client
        let mut entry = self
            .clients
            .entry(client.to_string())
            .or_insert(ClientRateState {
                count: 0,
                window_start: now,
            });

        // window expired..? Reset it
        if now.saturating_duration_since(entry.window_start) > self.window {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_requests
    }

    fn sweep(&self, now: Instant) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, state| now.saturating_duration_since(state.window_start) <= self.window);
        before.saturating_sub(self.clients.len())
    }

    fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

// Sweeper - drops expired windows every `every`
pub async fn sweeper(limiter: Arc<dyn RateLimiter>, every: Duration) {
    let mut ticker = interval(every);
    debug!(interval = ?every, "rate limit sweeper started");

    loop {
        ticker.tick().await;

        let removed = limiter.sweep(Instant::now());
        TRACKED_CLIENTS.set(limiter.tracked_clients() as f64);
        if removed > 0 {
            debug!(removed, "dropped expired rate limit windows");
        }
    }
}
