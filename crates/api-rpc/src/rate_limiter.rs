//! Write throttle
//!
//! Token bucket shared by all clients of the daemon. Only mutating
//! methods draw from it; reads are never throttled.

use std::sync::Mutex;
use tokio::time::Instant;

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    burst: f64,
    per_second: f64,
}

impl RateLimiter {
    /// `burst` requests may arrive at once, then `per_second` are admitted.
    /// A zero burst is raised to 1.
    pub fn new(burst: u32, per_second: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            bucket: Mutex::new(Bucket {
                tokens: burst,
                refilled_at: Instant::now(),
            }),
            burst,
            per_second: f64::from(per_second),
        }
    }

    /// Take one token; false when the bucket is empty
    pub async fn check(&self) -> bool {
        let now = Instant::now();
        // A poisoned lock only means another request panicked mid-update
        let mut bucket = match self.bucket.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.burst);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
