//! Rate limiter for preventing brute force attacks on login

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,       // 5 minutes
            ban_duration_seconds: 900, // 15 minutes
        }
    }
}

impl RateLimiterConfig {
    /// Create a new RateLimiterConfig from environment variables
    ///
    /// # Environment Variables
    /// - `LOGIN_MAX_ATTEMPTS`: Failed attempts before lockout (default: 5)
    /// - `LOGIN_WINDOW_SECONDS`: Window the attempts are counted in (default: 300)
    /// - `LOGIN_LOCKOUT_SECONDS`: Lockout duration (default: 900)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_attempts = std::env::var("LOGIN_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_attempts);

        let window_seconds = std::env::var("LOGIN_WINDOW_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.window_seconds);

        let ban_duration_seconds = std::env::var("LOGIN_LOCKOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ban_duration_seconds);

        Self {
            max_attempts,
            window_seconds,
            ban_duration_seconds,
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Failed attempts in the current window
    failures: u32,
    /// Start of the current window
    window_start: Instant,
    /// Lockout expiration time
    ban_expires: Option<Instant>,
}

/// Per-key counter of failed logins
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// False while `key` is locked out
    pub async fn check(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let key = normalize(key);
        let Some(ban_expires) = entries.get(&key).map(|entry| entry.ban_expires) else {
            return true;
        };

        match ban_expires {
            Some(ban_expires) if now < ban_expires => false,
            Some(_) => {
                // Ban expired, start over
                entries.remove(&key);
                true
            }
            None => true,
        }
    }

    /// Count a failed attempt, locking the key out once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        // Forget keys whose window and lockout have both lapsed
        entries.retain(|_, entry| match entry.ban_expires {
            Some(ban_expires) => now < ban_expires,
            None => now.duration_since(entry.window_start) < window,
        });

        let entry = entries
            .entry(normalize(key))
            .or_insert(RateLimiterEntry {
                failures: 0,
                window_start: now,
                ban_expires: None,
            });

        if now.duration_since(entry.window_start) >= window {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;

        if entry.failures >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Locked out {} for {} seconds after {} failed logins",
                key, self.config.ban_duration_seconds, entry.failures
            );
        }
    }

    /// Forget all failures for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(&normalize(key));
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn limiter(max_attempts: u32, ban_duration_seconds: u64) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds: 300,
            ban_duration_seconds,
        })
    }

    #[tokio::test]
    async fn test_locks_out_after_max_failures() {
        let limiter = limiter(3, 900);

        for _ in 0..2 {
            assert!(limiter.check("a@example.com").await);
            limiter.record_failure("a@example.com").await;
        }
        assert!(limiter.check("a@example.com").await);
        limiter.record_failure("a@example.com").await;

        assert!(!limiter.check("a@example.com").await);
        assert!(!limiter.check("A@Example.com").await);
        assert!(limiter.check("b@example.com").await);
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter(2, 900);

        limiter.record_failure("a@example.com").await;
        limiter.reset("a@example.com").await;
        limiter.record_failure("a@example.com").await;

        assert!(limiter.check("a@example.com").await);
    }

    #[tokio::test]
    async fn test_lockout_expires() {
        let limiter = limiter(1, 0);

        limiter.record_failure("a@example.com").await;
        assert!(limiter.check("a@example.com").await);
    }

    #[tokio::test]
    async fn test_failures_in_separate_windows_never_lock() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 2,
            window_seconds: 0,
            ban_duration_seconds: 900,
        });

        for _ in 0..5 {
            assert!(limiter.check("a@example.com").await);
            limiter.record_failure("a@example.com").await;
        }
        assert!(limiter.check("a@example.com").await);
    }

    #[tokio::test]
    async fn test_lapsed_entries_are_evicted() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 5,
            window_seconds: 0,
            ban_duration_seconds: 0,
        });

        for i in 0..1000 {
            let key = format!("nobody{}@example.com", i);
            assert!(limiter.check(&key).await);
            limiter.record_failure(&key).await;
        }
        assert_eq!(limiter.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_lockout_is_removed() {
        let limiter = limiter(1, 0);

        limiter.record_failure("a@example.com").await;
        assert_eq!(limiter.entries.lock().await.len(), 1);

        assert!(limiter.check("a@example.com").await);
        assert!(limiter.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_active_entries_survive_pruning() {
        let limiter = limiter(3, 900);

        limiter.record_failure("a@example.com").await;
        limiter.record_failure("b@example.com").await;
        assert_eq!(limiter.entries.lock().await.len(), 2);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        unsafe {
            std::env::set_var("LOGIN_MAX_ATTEMPTS", "10");
            std::env::remove_var("LOGIN_WINDOW_SECONDS");
            std::env::set_var("LOGIN_LOCKOUT_SECONDS", "not-a-number");
        }

        let config = RateLimiterConfig::from_env();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.window_seconds, 300);
        assert_eq!(config.ban_duration_seconds, 900);

        unsafe {
            std::env::remove_var("LOGIN_MAX_ATTEMPTS");
            std::env::remove_var("LOGIN_LOCKOUT_SECONDS");
        }
    }
}
