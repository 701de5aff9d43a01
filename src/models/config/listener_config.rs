//! Listener tuning knobs.
//!
//! Everything here has a sensible default; callers only override what they need via
//! the `with_*` builders.

use std::time::Duration;

use crate::utils::{
	constants::{
		DEFAULT_FETCH_MAX_RETRIES, DEFAULT_FETCH_RETRY_DELAY_MS, DEFAULT_POLL_INTERVAL_MS,
		DEFAULT_WAIT_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
	},
	RetryConfig,
};

/// Options of a wait-for-confirmation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
	/// Delay between two status reads
	pub interval: Duration,
	/// Upper bound of the whole wait; `None` waits until the status settles
	pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
	fn default() -> Self {
		Self {
			interval: Duration::from_millis(DEFAULT_WAIT_INTERVAL_MS),
			timeout: Some(Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS)),
		}
	}
}

impl WaitOptions {
	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}
}

/// Configuration of a single listener
#[derive(Debug, Clone)]
pub struct ListenerConfig {
	/// How often poll based sources query their endpoint
	pub poll_interval: Duration,
	/// Wait settings used when a record needs a confirmed transaction before matching
	pub wait: WaitOptions,
	/// Bounded retry applied while a transaction is not yet visible on the node
	pub fetch_retry: RetryConfig,
}

impl Default for ListenerConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
			wait: WaitOptions::default(),
			fetch_retry: RetryConfig::fixed(
				DEFAULT_FETCH_MAX_RETRIES,
				Duration::from_millis(DEFAULT_FETCH_RETRY_DELAY_MS),
			),
		}
	}
}

impl ListenerConfig {
	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	pub fn with_wait(mut self, wait: WaitOptions) -> Self {
		self.wait = wait;
		self
	}

	pub fn with_fetch_retry(mut self, retry: RetryConfig) -> Self {
		self.fetch_retry = retry;
		self
	}
}
