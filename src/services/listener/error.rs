//! Listener errors.
//!
//! [`ListenerError`] rejects a setup call (`on`, `start`). [`FeedError`] describes a
//! problem with one feed record; it never stops the listener and is only reported to
//! error callbacks.

use thiserror::Error;

use crate::{
	models::{Category, NetworkKind},
	services::{blockchain::TransportError, transaction::TransactionError},
};

#[derive(Debug, Error)]
pub enum ListenerError {
	/// The filter is contradictory or incomplete
	#[error("Configuration error: {0}")]
	ConfigurationError(String),

	#[error("{category} listeners are not supported on {network} networks")]
	NotImplemented {
		network: NetworkKind,
		category: Category,
	},

	#[error("Connection unavailable: {0}")]
	ConnectionUnavailable(String),

	/// The node refused the subscription or a prerequisite read failed
	#[error("Subscription error: {0}")]
	SubscriptionError(String),

	#[error("Listener is stopped")]
	Stopped,
}

impl ListenerError {
	pub fn configuration_error(msg: impl Into<String>) -> Self {
		let error = Self::ConfigurationError(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn not_implemented(network: NetworkKind, category: Category) -> Self {
		let error = Self::NotImplemented { network, category };
		tracing::error!("{}", error);
		error
	}

	pub fn connection_unavailable(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionUnavailable(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn subscription_error(msg: impl Into<String>) -> Self {
		let error = Self::SubscriptionError(msg.into());
		tracing::error!("{}", error);
		error
	}
}

#[derive(Debug, Clone, Error)]
pub enum FeedError {
	/// The node is throttling this client
	#[error("Events limit reached: {0}")]
	EventsLimitReached(String),

	#[error("Cannot decode feed record: {0}")]
	Decode(String),

	#[error("Feed transport error: {0}")]
	Transport(String),

	/// The listener fell behind and the shared connection dropped records
	#[error("Listener lagged behind, {0} records skipped")]
	Lagged(u64),

	#[error("Feed closed")]
	Closed,

	#[error("Secondary fetch failed: {0}")]
	Fetch(TransactionError),

	#[error("Callback panicked: {0}")]
	CallbackPanicked(String),
}

impl FeedError {
	/// Classifies an error message pushed by the node
	pub fn from_pushed_error(message: impl Into<String>) -> Self {
		let message = message.into();
		let throttled = crate::utils::constants::EVENTS_LIMIT_MARKERS
			.iter()
			.any(|marker| message.contains(marker));
		if throttled {
			Self::EventsLimitReached(message)
		} else {
			Self::Decode(message)
		}
	}
}

impl From<TransportError> for FeedError {
	fn from(err: TransportError) -> Self {
		match err {
			TransportError::Closed => Self::Closed,
			ref e if e.is_rate_limited() => Self::EventsLimitReached(e.to_string()),
			e => Self::Transport(e.to_string()),
		}
	}
}

impl From<TransactionError> for FeedError {
	fn from(err: TransactionError) -> Self {
		Self::Fetch(err)
	}
}
