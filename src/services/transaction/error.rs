//! Transaction read errors.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TransactionError {
	/// The node still did not know the transaction after every attempt
	#[error("Transaction {id} not found after {attempts} attempts")]
	TransactionNotFound { id: String, attempts: u32 },

	#[error("RPC request failed: {0}")]
	RpcRequestError(String),

	/// The transaction was included but reverted or was rejected
	#[error("Transaction {0} failed")]
	TransactionFailed(String),

	#[error("Transaction {id} not settled within {timeout:?}")]
	WaitTimeout { id: String, timeout: Duration },
}

impl TransactionError {
	pub fn transaction_not_found(id: impl Into<String>, attempts: u32) -> Self {
		let error = Self::TransactionNotFound {
			id: id.into(),
			attempts,
		};
		tracing::error!("{}", error);
		error
	}

	pub fn rpc_request_error(msg: impl Into<String>) -> Self {
		let error = Self::RpcRequestError(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn transaction_failed(id: impl Into<String>) -> Self {
		let error = Self::TransactionFailed(id.into());
		tracing::warn!("{}", error);
		error
	}

	pub fn wait_timeout(id: impl Into<String>, timeout: Duration) -> Self {
		let error = Self::WaitTimeout {
			id: id.into(),
			timeout,
		};
		tracing::warn!("{}", error);
		error
	}
}
