//! Token bucket rate limiter for per-client resolve admission.
//!
//! Advisory only: the limiter answers a yes/no admission question and is
//! consulted by the HTTP layer before resolve work starts. It never blocks
//! a request, its counts are approximate and they are lost on restart.

use std::collections::HashMap;
use std::net::IpAddr;

use tokio::sync::RwLock;
use tokio::time::Instant;

use debridge_core::RateLimitConfig;

/// Token bucket for a single client address.
///
/// Tokens are added at a constant rate and consumed per request; an empty
/// bucket means the client is over its rate.
struct TokenBucket {
    /// Max tokens (= requests per minute).
    capacity: f32,
    /// Current available tokens.
    tokens: f32,
    /// Tokens added per second.
    refill_rate: f32,
    /// Last refill time.
    last_refill: Instant,
}

impl TokenBucket {
    /// The bucket starts full, allowing immediate requests up to capacity.
    fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute as f32;
        Self {
            capacity,
            tokens: capacity,
            refill_rate: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// A refilled-to-capacity bucket has not been used for at least a full
    /// window; such entries are reclaimable.
    fn is_idle(&mut self) -> bool {
        self.refill();
        self.tokens >= self.capacity
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f32();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Bounded pool of per-client token buckets.
///
/// At most `max_tracked_clients` addresses are tracked. When the table is
/// saturated, idle buckets are swept first; if nothing can be reclaimed
/// the request is admitted untracked rather than rejected or blocked.
pub struct ClientRateLimiter {
    enabled: bool,
    requests_per_minute: u32,
    max_tracked_clients: usize,
    buckets: RwLock<HashMap<IpAddr, TokenBucket>>,
}

impl ClientRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            requests_per_minute: config.requests_per_minute,
            max_tracked_clients: config.max_tracked_clients,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Admission decision for one request from `client`.
    pub async fn check(&self, client: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.write().await;

        if let Some(bucket) = buckets.get_mut(&client) {
            return bucket.try_acquire();
        }

        if buckets.len() >= self.max_tracked_clients {
            buckets.retain(|_, bucket| !bucket.is_idle());
            if buckets.len() >= self.max_tracked_clients {
                // Still saturated; admit untracked rather than fail
                return true;
            }
        }

        let mut bucket = TokenBucket::new(self.requests_per_minute);
        let admitted = bucket.try_acquire();
        buckets.insert(client, bucket);
        admitted
    }

    /// Number of currently tracked client addresses.
    pub async fn tracked_clients(&self) -> usize {
        self.buckets.read().await.len()
    }
}
