//! Bounded-retry read of one transaction.
//!
//! A freshly submitted transaction is often unknown to the node for a few seconds.
//! "Not found" is therefore retried with a fixed delay, while every other failure is
//! reported at once. A successful read is cached for the lifetime of the fetcher and
//! its clones; the status is always read fresh.

use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::OnceCell;

use crate::{
	models::{TransactionStatus, WaitOptions},
	services::{
		blockchain::{BlockChainError, ChainClient},
		transaction::TransactionError,
	},
	utils::{
		constants::{DEFAULT_FETCH_MAX_RETRIES, DEFAULT_FETCH_RETRY_DELAY_MS},
		RetryConfig, WithRetry,
	},
};

#[derive(Clone)]
pub struct TransactionDataFetcher {
	id: String,
	client: Arc<dyn ChainClient>,
	retry: RetryConfig,
	cache: Arc<OnceCell<Value>>,
}

impl TransactionDataFetcher {
	/// Creates a fetcher retrying 5 times, 2 seconds apart
	pub fn new(id: impl Into<String>, client: Arc<dyn ChainClient>) -> Self {
		Self {
			id: id.into(),
			client,
			retry: RetryConfig::fixed(
				DEFAULT_FETCH_MAX_RETRIES,
				Duration::from_millis(DEFAULT_FETCH_RETRY_DELAY_MS),
			),
			cache: Arc::new(OnceCell::new()),
		}
	}

	pub fn with_retry(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;
		self
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// The cached record, if a read already succeeded
	pub fn cached(&self) -> Option<&Value> {
		self.cache.get()
	}

	/// Returns the transaction record, reading it from the node on first use
	///
	/// # Errors
	/// * `TransactionError::TransactionNotFound` - Still unknown after every attempt
	/// * `TransactionError::RpcRequestError` - Any other failure, without retry
	pub async fn get_data(&self) -> Result<&Value, TransactionError> {
		self.cache
			.get_or_try_init(|| async {
				let retry = WithRetry::new(self.retry.clone());
				retry
					.attempt_if(
						|| self.client.get_transaction(&self.id),
						BlockChainError::is_not_found,
					)
					.await
					.map_err(|e| match e {
						BlockChainError::NotFound(_) => TransactionError::transaction_not_found(
							&self.id,
							self.retry.max_attempts(),
						),
						other => TransactionError::rpc_request_error(other.to_string()),
					})
			})
			.await
	}

	/// Reads the current status; a transaction the node does not know yet is pending
	pub async fn get_status(&self) -> Result<TransactionStatus, TransactionError> {
		match self.client.get_transaction_status(&self.id).await {
			Ok(status) => Ok(status),
			Err(BlockChainError::NotFound(_)) => Ok(TransactionStatus::Pending),
			Err(e) => Err(TransactionError::rpc_request_error(e.to_string())),
		}
	}

	/// Polls the status every `options.interval` until it leaves `Pending`
	///
	/// # Returns
	/// * `Ok(TransactionStatus::Confirmed)` - The transaction succeeded
	/// * `Err(TransactionError::TransactionFailed)` - The transaction failed
	/// * `Err(TransactionError::WaitTimeout)` - `options.timeout` elapsed first
	pub async fn wait(&self, options: WaitOptions) -> Result<TransactionStatus, TransactionError> {
		match options.timeout {
			Some(limit) => tokio::time::timeout(limit, self.poll_until_settled(options.interval))
				.await
				.map_err(|_| TransactionError::wait_timeout(&self.id, limit))?,
			None => self.poll_until_settled(options.interval).await,
		}
	}

	async fn poll_until_settled(
		&self,
		interval: Duration,
	) -> Result<TransactionStatus, TransactionError> {
		loop {
			match self.get_status().await? {
				TransactionStatus::Pending => tokio::time::sleep(interval).await,
				TransactionStatus::Confirmed => return Ok(TransactionStatus::Confirmed),
				TransactionStatus::Failed => {
					return Err(TransactionError::transaction_failed(&self.id))
				}
			}
		}
	}
}

impl fmt::Debug for TransactionDataFetcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TransactionDataFetcher")
			.field("id", &self.id)
			.field("network", &self.client.network())
			.field("cached", &self.cache.initialized())
			.finish()
	}
}
