//! Bounded retry with exponential backoff and jitter.
//!
//! ```text
//! attempt 0          runs immediately
//! attempt n (n > 0)  after min(max_delay, initial_delay * multiplier^(n-1)) * jitter
//! jitter             uniform in [0.75, 1.25] when enabled, 1.0 otherwise
//! ```
//!
//! Every failure is recorded. After `max_attempts` failures the caller gets a
//! [`RetryError`] listing each attempt's message in order.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::fault::try_catch_async;

/// Lower jitter bound (−25%).
pub const JITTER_MIN: f64 = 0.75;
/// Upper jitter bound (+25%).
pub const JITTER_MAX: f64 = 1.25;

/// Classifies an attempt's error message.
pub type RetryPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Retry policy.
#[derive(Clone)]
pub struct RetryOptions {
    /// Total attempts including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub use_jitter: bool,
    /// Evaluated per failure and reported in the attempt log. Does not
    /// stop the loop: every attempt up to `max_attempts` still runs.
    pub is_retryable: Option<RetryPredicate>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
            use_jitter: true,
            is_retryable: None,
        }
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("use_jitter", &self.use_jitter)
            .field("is_retryable", &self.is_retryable.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl RetryOptions {
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_initial_delay(mut self, d: Duration) -> Self {
        self.initial_delay = d;
        self
    }

    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    pub fn with_backoff_multiplier(mut self, m: f64) -> Self {
        self.backoff_multiplier = m;
        self
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.use_jitter = enabled;
        self
    }

    pub fn with_retryable<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Some(Arc::new(predicate));
        self
    }

    /// Delay to wait after the failure of zero-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = if self.use_jitter {
            rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX)
        } else {
            1.0
        };
        self.delay_with_factor(attempt, factor)
    }

    fn delay_with_factor(&self, attempt: u32, factor: f64) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exp);
        let capped = base.min(self.max_delay.as_secs_f64());
        let secs = (capped * factor).max(0.0);
        if secs.is_finite() {
            Duration::from_secs_f64(secs)
        } else {
            self.max_delay
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

// ---------------------------------------------------------------------------
// Aggregated failure
// ---------------------------------------------------------------------------

/// Every attempt failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryError {
    attempts: Vec<String>,
}

impl RetryError {
    pub fn new(attempts: Vec<String>) -> Self {
        Self { attempts }
    }

    /// Per-attempt messages, first attempt first.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.attempts.last().map(String::as_str)
    }
}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation failed after {} attempts:", self.attempts.len())?;
        for (i, msg) in self.attempts.iter().enumerate() {
            write!(f, "\nattempt {}: {}", i + 1, msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for RetryError {}

// ---------------------------------------------------------------------------
// Retry loop
// ---------------------------------------------------------------------------

/// Run `operation` until it succeeds or the attempt budget is spent.
///
/// A panic inside an attempt counts as a failure carrying the panic message.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    options: &RetryOptions,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = options.attempts();
    let mut failures = Vec::new();

    for attempt in 0..max_attempts {
        let message = match try_catch_async(async { operation().await }).await {
            Ok(Ok(value)) => {
                if attempt > 0 {
                    tracing::debug!(attempt = attempt + 1, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Ok(Err(e)) => e.to_string(),
            Err(fault) => fault.to_string(),
        };

        let retryable = options.is_retryable.as_ref().map(|p| p(&message));
        let remaining = max_attempts - attempt - 1;

        if remaining == 0 {
            tracing::warn!(
                attempt = attempt + 1,
                max_attempts,
                retryable = ?retryable,
                error = %message,
                "attempt failed, giving up"
            );
            failures.push(message);
            break;
        }

        let delay = options.delay_for(attempt);
        tracing::warn!(
            attempt = attempt + 1,
            max_attempts,
            retryable = ?retryable,
            delay_ms = delay.as_millis() as u64,
            error = %message,
            "attempt failed, retrying"
        );
        failures.push(message);
        tokio::time::sleep(delay).await;
    }

    Err(RetryError::new(failures))
}

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

const NETWORK_MARKERS: &[&str] = &[
    "network",
    "fetch",
    "timeout",
    "timed out",
    "connection",
    "econnrefused",
    "econnreset",
    "enotfound",
    "dns",
    "socket",
];

/// Whether an error message looks like a transport failure.
pub fn is_network_error(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    NETWORK_MARKERS.iter().any(|m| lower.contains(m))
}

/// 408, 429 and every 5xx.
pub fn is_retryable_http_error(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryOptions {
        RetryOptions::default().with_jitter(false)
    }

    #[test]
    fn test_defaults() {
        let o = RetryOptions::default();
        assert_eq!(o.max_attempts, 3);
        assert_eq!(o.initial_delay, Duration::from_millis(1000));
        assert_eq!(o.max_delay, Duration::from_millis(10_000));
        assert_eq!(o.backoff_multiplier, 2.0);
        assert!(o.use_jitter);
        assert!(o.is_retryable.is_none());
    }

    #[test]
    fn test_exponential_schedule_is_capped() {
        let o = no_jitter();
        let ms: Vec<u128> = (0..6).map(|a| o.delay_for(a).as_millis()).collect();
        assert_eq!(ms, vec![1000, 2000, 4000, 8000, 10_000, 10_000]);
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let o = RetryOptions::default();
        for _ in 0..200 {
            let d = o.delay_for(1).as_millis();
            assert!((1500..=2500).contains(&d), "delay {} out of band", d);
        }
    }

    #[test]
    fn test_jitter_applies_after_cap() {
        let o = RetryOptions::default();
        assert_eq!(o.delay_with_factor(10, JITTER_MAX), Duration::from_millis(12_500));
        assert_eq!(o.delay_with_factor(10, JITTER_MIN), Duration::from_millis(7_500));
    }

    #[test]
    fn test_degenerate_multiplier() {
        let o = no_jitter().with_backoff_multiplier(-3.0);
        assert_eq!(o.delay_for(1), Duration::ZERO);
        let o = no_jitter().with_backoff_multiplier(f64::INFINITY);
        assert_eq!(o.delay_for(2), o.max_delay);
    }

    #[test]
    fn test_retry_error_display() {
        let err = RetryError::new(vec!["timeout".into(), "HTTP 503".into()]);
        assert_eq!(
            err.to_string(),
            "operation failed after 2 attempts:\nattempt 1: timeout\nattempt 2: HTTP 503"
        );
        assert_eq!(err.last_error(), Some("HTTP 503"));
    }

    #[test]
    fn test_classifiers() {
        assert!(is_network_error("Failed to fetch"));
        assert!(is_network_error("connect ECONNREFUSED 10.0.0.1:8080"));
        assert!(is_network_error("request Timed Out"));
        assert!(!is_network_error("invalid certificate"));

        for s in [408, 429, 500, 502, 503, 504, 599] {
            assert!(is_retryable_http_error(s), "{}", s);
        }
        for s in [200, 301, 400, 401, 403, 404, 600] {
            assert!(!is_retryable_http_error(s), "{}", s);
        }
    }

    #[test]
    fn test_debug_hides_predicate() {
        let o = RetryOptions::default().with_retryable(is_network_error);
        assert!(format!("{:?}", o).contains("<fn>"));
    }
}
