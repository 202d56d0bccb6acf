use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Exponential backoff settings for outbound provider calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Factor applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset for translation provider requests (3 attempts).
    /// Delays: 250ms, 500ms. Kept short since a slow provider only delays
    /// the fallback to the next tier.
    pub fn provider_call() -> Self {
        Self::new(3, Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(1))
            .with_backoff_multiplier(2.0)
    }

    /// Delay before the given 0-indexed attempt
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::provider_call()
    }
}

/// Run `operation` until it succeeds or `config.max_attempts` is reached.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry_if(config, operation_name, operation, |_| true).await
}

/// Like [`with_retry`], but gives up immediately on errors for which
/// `should_retry` returns false (e.g. 4xx responses other than 429).
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut attempt = 0;
    loop {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!(
                "{}: retry {}/{} in {:?}",
                operation_name,
                attempt + 1,
                config.max_attempts,
                delay
            );
            sleep(delay).await;
        }

        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !should_retry(&error) {
            debug!("{}: not retryable: {}", operation_name, error);
            return Err(error);
        }

        attempt += 1;
        if attempt >= config.max_attempts {
            warn!(
                "{}: giving up after {} attempts: {}",
                operation_name, config.max_attempts, error
            );
            return Err(error);
        }

        warn!(
            "{}: attempt {}/{} failed: {}",
            operation_name, attempt, config.max_attempts, error
        );
    }
}

/// Whether a provider error is worth retrying.
///
/// Provider errors carry the HTTP status as `"... API error (<status> ...)"`.
/// 429 and 5xx are retried, other statuses are not; errors without a status
/// (network failures, timeouts) are retried.
pub fn is_retryable_status_error(error: &anyhow::Error) -> bool {
    let message = error.to_string();

    let status = message
        .find("API error (")
        .map(|start| &message[start + "API error (".len()..])
        .and_then(|rest| rest.split(|c: char| !c.is_ascii_digit()).next())
        .and_then(|digits| digits.parse::<u16>().ok());

    match status {
        Some(status) => status == 429 || status >= 500,
        None => true,
    }
}
