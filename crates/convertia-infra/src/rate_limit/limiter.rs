use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-key sliding window of request timestamps.
#[derive(Clone, Default)]
struct RateLimitBucket {
    attempts: VecDeque<Instant>,
}

impl RateLimitBucket {
    /// Drop attempts older than the window. Pruning happens lazily on
    /// access, so an idle bucket holds stale timestamps until touched or
    /// swept by `cleanup_expired_buckets`.
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.attempts.front() {
            if now.duration_since(*oldest) >= window {
                self.attempts.pop_front();
            } else {
                break;
            }
        }
    }

    fn check_and_record(&mut self, now: Instant, limit: u32, window: Duration) -> (bool, u32) {
        self.prune(now, window);

        if (self.attempts.len() as u32) < limit {
            self.attempts.push_back(now);
            let remaining = limit.saturating_sub(self.attempts.len() as u32);
            (true, remaining)
        } else {
            (false, 0)
        }
    }

    /// Time until the oldest attempt leaves the window and frees a slot.
    fn retry_after(&self, now: Instant, window: Duration) -> Duration {
        match self.attempts.front() {
            Some(oldest) => window.saturating_sub(now.duration_since(*oldest)),
            None => Duration::ZERO,
        }
    }

    fn newest(&self) -> Option<Instant> {
        self.attempts.back().copied()
    }
}

/// Sharded sliding-window rate limiter.
///
/// Keys are opaque strings (`ip:…`, `account:…`) hashed across separate
/// mutex-guarded maps to reduce lock contention. Unlike a fixed-window
/// counter, the sliding window never admits a burst of `2 * limit`
/// requests around a window boundary.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, RateLimitBucket>>>>,
    shard_count: usize,
    limit_per_minute: u32,
    window: Duration,
    max_buckets: usize,
}

impl HttpRateLimiter {
    /// Create a new rate limiter with default shard count (16 shards)
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_shards(limit_per_minute, 16)
    }

    /// Create rate limiter with custom shard count
    ///
    /// # Arguments
    /// * `limit_per_minute` - Rate limit per minute per key
    /// * `shard_count` - Number of shards (a power of 2 distributes best)
    pub fn with_shards(limit_per_minute: u32, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            shard_count: shard_count.max(1),
            limit_per_minute,
            window: Duration::from_secs(60),
            max_buckets: 10_000,
        }
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shard_count
    }

    /// Record one request against `key` under the limiter's default limit.
    ///
    /// `Ok(remaining)` admits the request; `Err(retry_after)` rejects it
    /// with the time until a slot frees up.
    pub async fn check_rate_limit(&self, key: &str) -> Result<u32, Duration> {
        self.check_rate_limit_with(key, self.limit_per_minute).await
    }

    /// Same as [`check_rate_limit`](Self::check_rate_limit) with an
    /// explicit per-call limit, for endpoints with stricter budgets.
    pub async fn check_rate_limit_with(&self, key: &str, limit: u32) -> Result<u32, Duration> {
        let now = Instant::now();
        let shard_index = self.shard_index(key);
        let mut buckets = self.shards[shard_index].lock().await;

        if buckets.len() >= self.max_buckets {
            let window = self.window;
            buckets.retain(|_key, bucket| {
                bucket.prune(now, window);
                !bucket.attempts.is_empty()
            });

            // Still at capacity after pruning: evict the least recently
            // active bucket rather than refusing new keys.
            if buckets.len() >= self.max_buckets {
                let oldest_key = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.newest())
                    .map(|(k, _)| k.clone());

                if let Some(key_to_remove) = oldest_key {
                    buckets.remove(&key_to_remove);
                    tracing::debug!(
                        removed_key = %key_to_remove,
                        shard_index = shard_index,
                        remaining_buckets = buckets.len(),
                        "Evicted least recently active rate limit bucket"
                    );
                }
            }
        }

        let bucket = buckets.entry(key.to_string()).or_default();

        let (allowed, remaining) = bucket.check_and_record(now, limit, self.window);
        if allowed {
            Ok(remaining)
        } else {
            Err(bucket.retry_after(now, self.window))
        }
    }

    /// Drop buckets whose every attempt has aged out of the window.
    /// Intended to run on a timer from the binary.
    pub async fn cleanup_expired_buckets(&self) {
        let now = Instant::now();
        let window = self.window;
        let mut total_cleaned = 0;

        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before_count = buckets.len();
            buckets.retain(|_key, bucket| {
                bucket.prune(now, window);
                !bucket.attempts.is_empty()
            });
            total_cleaned += before_count - buckets.len();
        }

        if total_cleaned > 0 {
            tracing::debug!(
                buckets_cleaned = total_cleaned,
                "Cleaned up expired rate limit buckets across all shards"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_admits_up_to_limit_then_rejects() {
        let limiter = HttpRateLimiter::new(3);
        assert_eq!(limiter.check_rate_limit("ip:10.0.0.1").await, Ok(2));
        assert_eq!(limiter.check_rate_limit("ip:10.0.0.1").await, Ok(1));
        assert_eq!(limiter.check_rate_limit("ip:10.0.0.1").await, Ok(0));

        let retry_after = limiter
            .check_rate_limit("ip:10.0.0.1")
            .await
            .expect_err("fourth request should be rejected");
        assert!(retry_after <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = HttpRateLimiter::new(1);
        assert!(limiter.check_rate_limit("ip:10.0.0.1").await.is_ok());
        assert!(limiter.check_rate_limit("ip:10.0.0.2").await.is_ok());
        assert!(limiter.check_rate_limit("ip:10.0.0.1").await.is_err());
    }

    #[tokio::test]
    async fn test_per_call_limit_overrides_default() {
        let limiter = HttpRateLimiter::new(100);
        assert!(limiter.check_rate_limit_with("account:a", 1).await.is_ok());
        assert!(limiter.check_rate_limit_with("account:a", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_rejection_does_not_consume_a_slot() {
        let limiter = HttpRateLimiter::new(1);
        assert!(limiter.check_rate_limit("ip:10.0.0.1").await.is_ok());
        for _ in 0..5 {
            assert!(limiter.check_rate_limit("ip:10.0.0.1").await.is_err());
        }
        // Exactly one recorded attempt remains in the window.
        let shard = limiter.shard_index("ip:10.0.0.1");
        let buckets = limiter.shards[shard].lock().await;
        assert_eq!(buckets["ip:10.0.0.1"].attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_empty_buckets() {
        let limiter = HttpRateLimiter::new(5);
        limiter.check_rate_limit("ip:10.0.0.1").await.ok();
        limiter.cleanup_expired_buckets().await;

        let shard = limiter.shard_index("ip:10.0.0.1");
        let buckets = limiter.shards[shard].lock().await;
        assert!(buckets.contains_key("ip:10.0.0.1"));
    }
}
