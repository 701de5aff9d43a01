//! Retry mechanism for handling transient failures in async operations.
//!
//! The delay doubles after every failed attempt, capped at `max_delay`. Setting
//! `initial_delay == max_delay` (see [`RetryConfig::fixed`]) gives a fixed delay.

use std::time::Duration;

/// Configuration for retry behavior
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
	/// Number of retries after the first attempt
	pub max_retries: u32,

	/// Delay before the first retry
	pub initial_delay: Duration,

	/// Upper bound of the delay between two attempts
	pub max_delay: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			initial_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(8),
		}
	}
}

impl RetryConfig {
	/// Retry configuration with the same delay between every attempt
	pub fn fixed(max_retries: u32, delay: Duration) -> Self {
		Self {
			max_retries,
			initial_delay: delay,
			max_delay: delay,
		}
	}

	/// Total number of attempts, the first one included
	pub fn max_attempts(&self) -> u32 {
		self.max_retries.saturating_add(1)
	}

	fn delay_for(&self, retry: u32) -> Duration {
		let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
		self.initial_delay
			.checked_mul(factor)
			.unwrap_or(self.max_delay)
			.min(self.max_delay)
	}
}

/// Handler for retrying operations with backoff
pub struct WithRetry {
	config: RetryConfig,
}

impl WithRetry {
	pub fn new(config: RetryConfig) -> Self {
		Self { config }
	}

	pub fn with_default_config() -> Self {
		Self::new(RetryConfig::default())
	}

	/// Attempts an async operation, retrying every failure
	///
	/// # Arguments
	/// * `operation` - An async operation that returns a Result
	///
	/// # Returns
	/// * `Ok(T)` - If the operation succeeds
	/// * `Err(E)` - The last error once all attempts failed
	pub async fn attempt<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
	where
		F: Fn() -> Fut + Send + Sync,
		Fut: std::future::Future<Output = Result<T, E>> + Send,
		T: Send,
		E: std::fmt::Debug + Send,
	{
		self.attempt_if(operation, |_| true).await
	}

	/// Attempts an async operation, retrying only the failures accepted by `should_retry`
	///
	/// Errors rejected by `should_retry` are returned immediately without sleeping.
	///
	/// # Arguments
	/// * `operation` - An async operation that returns a Result
	/// * `should_retry` - Decides whether an error is transient
	///
	/// # Returns
	/// * `Ok(T)` - If the operation succeeds
	/// * `Err(E)` - The first permanent error, or the last transient one once the
	///   retries are exhausted
	pub async fn attempt_if<F, Fut, T, E, P>(&self, operation: F, should_retry: P) -> Result<T, E>
	where
		F: Fn() -> Fut + Send + Sync,
		Fut: std::future::Future<Output = Result<T, E>> + Send,
		T: Send,
		E: std::fmt::Debug + Send,
		P: Fn(&E) -> bool + Send + Sync,
	{
		let mut retry = 0;
		loop {
			match operation().await {
				Ok(value) => return Ok(value),
				Err(e) => {
					if !should_retry(&e) || retry >= self.config.max_retries {
						return Err(e);
					}
					retry += 1;

					let delay = self.config.delay_for(retry);
					tracing::debug!(retry, ?delay, error = ?e, "Retrying operation");
					tokio::time::sleep(delay).await;
				}
			}
		}
	}
}
