//! Errors of chain clients.

use thiserror::Error;

use crate::services::blockchain::transports::TransportError;

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum BlockChainError {
	/// The node could not be reached
	#[error("Connection error: {0}")]
	ConnectionError(String),

	/// The node answered with an error or with something we cannot read
	#[error("Request error: {0}")]
	RequestError(String),

	/// The node does not know the transaction (yet)
	///
	/// Freshly submitted transactions are usually not indexed immediately, so callers
	/// treat this as transient.
	#[error("Transaction not found: {0}")]
	NotFound(String),

	#[error("Internal error: {0}")]
	InternalError(String),
}

impl BlockChainError {
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		tracing::error!("{}", error);
		error
	}

	/// Expected while a transaction propagates, so only traced at debug level
	pub fn not_found(id: impl Into<String>) -> Self {
		let error = Self::NotFound(id.into());
		tracing::debug!("{}", error);
		error
	}

	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}

impl From<TransportError> for BlockChainError {
	fn from(err: TransportError) -> Self {
		match err {
			TransportError::Network(_) | TransportError::Timeout(_) | TransportError::Closed => {
				Self::connection_error(err.to_string())
			}
			TransportError::Http { .. } | TransportError::ResponseParse(_) => {
				Self::request_error(err.to_string())
			}
		}
	}
}
