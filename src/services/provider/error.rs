//! Provider errors.

use thiserror::Error;

use crate::models::NetworkKind;

#[derive(Debug, Error)]
pub enum ProviderError {
	#[error("A default provider for {0} networks is already initialized")]
	AlreadyInitialized(NetworkKind),

	#[error("No default provider for {0} networks has been initialized")]
	NotInitialized(NetworkKind),

	#[error("Invalid endpoint: {0}")]
	InvalidEndpoint(String),

	#[error("Connection error: {0}")]
	ConnectionError(String),
}

impl ProviderError {
	pub fn invalid_endpoint(msg: impl Into<String>) -> Self {
		let error = Self::InvalidEndpoint(msg.into());
		tracing::error!("{}", error);
		error
	}

	/// Probe failures are expected answers, so they are logged as warnings
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		tracing::warn!("{}", error);
		error
	}
}
