//! Retry with credential rotation.
//!
//! Every remote call goes through [`with_token_rotation`]: a retryable failure
//! advances the shared [`TokenPool`] cursor and the call is attempted again
//! with the next credential, after an exponential backoff, until the attempt
//! ceiling is reached. Permanent failures return immediately.

use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::error::StatsError;
use crate::github::{GitHubError, short_error_message};

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 250;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 10_000;

/// Maximum retries after the first attempt (8 attempts in total).
pub const MAX_RETRIES: usize = 7;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Total number of attempts, including the first.
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// A rotating pool of API credentials.
///
/// The cursor is shared by every caller holding the pool (usually through an
/// `Arc`), so a token that was rate limited in one call is skipped by the
/// next call too. The cursor is atomic, so concurrent callers never observe
/// a torn or out-of-range position.
#[derive(Debug, Default)]
pub struct TokenPool {
    tokens: Vec<String>,
    cursor: AtomicUsize,
}

impl TokenPool {
    /// Build a pool from credentials in priority order. Blank entries are dropped.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(Into::into)
            .map(|t: String| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            tokens,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of the credential the next call will use.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// The credential the next call will use.
    pub fn current(&self) -> Option<&str> {
        self.tokens.get(self.cursor()).map(String::as_str)
    }

    /// Advance to the next credential, wrapping around. Returns the new index.
    pub fn rotate(&self) -> usize {
        let len = self.tokens.len().max(1);
        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        (previous + 1) % len
    }
}

/// Run `operation` with the pool's current credential, rotating on retryable failures.
///
/// `label` identifies the call in log lines. Returns
/// [`StatsError::RetryExhausted`] when the last attempt still failed with a
/// retryable error and [`StatsError::RemoteCall`] for permanent failures.
///
/// # Example
///
/// ```ignore
/// let response = with_token_rotation(&pool, &RetryConfig::default(), "octocat", |token| {
///     let variables = variables.clone();
///     async move { client.graphql(USER_STATS, variables, &token).await }
/// })
/// .await?;
/// ```
pub async fn with_token_rotation<T, F, Fut>(
    pool: &TokenPool,
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T, StatsError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, GitHubError>>,
{
    if pool.is_empty() {
        return Err(StatsError::NoCredentials);
    }

    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        let token = pool.current().unwrap_or_default().to_string();
        operation(token)
    };

    let result = retry_op
        .retry(config.clone().into_backoff())
        .when(GitHubError::is_retryable)
        .notify(|err, dur| {
            let next = pool.rotate();
            tracing::debug!(
                "Retrying {} in {:?} with credential #{} (attempt {}): {}",
                label,
                dur,
                next + 1,
                attempt.load(Ordering::SeqCst),
                short_error_message(err)
            );
        })
        .await;

    result.map_err(|err| {
        if err.is_retryable() {
            let attempts = attempt.load(Ordering::SeqCst);
            tracing::warn!(label, attempts, "Retries exhausted: {}", short_error_message(&err));
            StatsError::RetryExhausted {
                attempts,
                source: err,
            }
        } else {
            StatsError::RemoteCall(err)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn fast_config(max_retries: usize) -> RetryConfig {
        RetryConfig::new(Duration::from_millis(1), Duration::from_millis(10), max_retries)
            .with_jitter(false)
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();

        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, MAX_RETRIES);
        assert_eq!(config.max_attempts(), 8);
        assert!(config.with_jitter);
    }

    #[test]
    fn test_retry_config_without_jitter() {
        let config = RetryConfig::default().with_jitter(false);
        assert!(!config.with_jitter);
        let _backoff = config.into_backoff();
    }

    #[test]
    fn test_pool_drops_blank_tokens() {
        let pool = TokenPool::new(["ghp_a", "  ", "", "ghp_b "]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.current(), Some("ghp_a"));
    }

    #[test]
    fn test_pool_rotation_wraps() {
        let pool = TokenPool::new(["a", "b", "c"]);
        assert_eq!(pool.rotate(), 1);
        assert_eq!(pool.current(), Some("b"));
        assert_eq!(pool.rotate(), 2);
        assert_eq!(pool.rotate(), 0);
        assert_eq!(pool.current(), Some("a"));
    }

    #[test]
    fn test_pool_rotation_is_consistent_across_threads() {
        let pool = Arc::new(TokenPool::new(["a", "b", "c", "d"]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        pool.rotate();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("rotation thread");
        }
        // 800 rotations over 4 tokens lands back on the first.
        assert_eq!(pool.cursor(), 0);
    }

    #[tokio::test]
    async fn test_empty_pool_fails_without_calling() {
        let pool = TokenPool::new(Vec::<String>::new());
        let calls = AtomicU32::new(0);

        let err = with_token_rotation(&pool, &fast_config(3), "octocat", |_token| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, GitHubError>(()) }
        })
        .await
        .expect_err("empty pool");

        assert!(matches!(err, StatsError::NoCredentials));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_rotates_to_next_token() {
        let pool = TokenPool::new(["first", "second", "third"]);
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let seen_capture = Arc::clone(&seen);
        let result = with_token_rotation(&pool, &fast_config(5), "octocat", move |token| {
            let seen = Arc::clone(&seen_capture);
            async move {
                let mut seen = seen.lock().unwrap_or_else(|e| e.into_inner());
                seen.push(token.clone());
                if seen.len() < 3 {
                    Err(GitHubError::RateLimited {
                        reset_at: chrono::Utc::now(),
                    })
                } else {
                    Ok(token)
                }
            }
        })
        .await
        .expect("third credential succeeds");

        assert_eq!(result, "third");
        let seen = seen.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(*seen, vec!["first", "second", "third"]);
        // The cursor stays on the credential that worked.
        assert_eq!(pool.current(), Some("third"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_after_ceiling() {
        let pool = TokenPool::new(["a", "b"]);
        let calls = Arc::new(AtomicU32::new(0));

        let calls_capture = Arc::clone(&calls);
        let err = with_token_rotation(&pool, &fast_config(3), "octocat", move |_token| {
            calls_capture.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(GitHubError::Http("connection reset".into())) }
        })
        .await
        .expect_err("always failing");

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match err {
            StatsError::RetryExhausted { attempts, source } => {
                assert_eq!(attempts, 4);
                assert!(matches!(source, GitHubError::Http(_)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let pool = TokenPool::new(["a", "b"]);
        let calls = Arc::new(AtomicU32::new(0));

        let calls_capture = Arc::clone(&calls);
        let err = with_token_rotation(&pool, &fast_config(5), "octocat", move |_token| {
            calls_capture.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(GitHubError::AuthRejected) }
        })
        .await
        .expect_err("auth rejection");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, StatsError::RemoteCall(GitHubError::AuthRejected)));
        assert_eq!(pool.cursor(), 0);
    }
}
