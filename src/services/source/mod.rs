//! Live record feeds.
//!
//! An [`EventSource`] turns a [`SubscriptionPlan`] into a never-ending stream of raw
//! records. Push networks share one WebSocket per endpoint through the provider's
//! pool; poll networks query a REST endpoint on a timer. Each listener owns its own
//! source, so closing one source never touches another listener's subscription.

mod evm;
mod ledger;
mod push;
mod utxo;

pub use evm::EvmSource;
pub use ledger::LedgerSource;
pub use utxo::UtxoSource;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::{
	models::{ListenerConfig, NetworkKind, RawFeedRecord},
	services::{
		blockchain::{EvmClient, TransportError, UtxoClient},
		listener::{FeedError, ListenerError},
		matcher::SubscriptionPlan,
		provider::Provider,
	},
};

/// Stream of raw records; errors describe a single record and never end the stream
pub type RecordStream = BoxStream<'static, Result<RawFeedRecord, FeedError>>;

#[async_trait]
pub trait EventSource: Send + Sync {
	fn network(&self) -> NetworkKind;

	/// Makes sure the underlying transport is reachable
	///
	/// Calling it again on a connected source is a no-op.
	async fn connect(&self) -> Result<(), TransportError>;

	/// Subscribes according to `plan` and returns the record feed
	///
	/// # Errors
	/// * `ConnectionUnavailable` - the transport is gone
	/// * `SubscriptionError` - the node rejected the subscription
	/// * `ConfigurationError` - the plan does not belong to this network
	async fn open(&self, plan: &SubscriptionPlan) -> Result<RecordStream, ListenerError>;

	/// Unsubscribes and gives the transport back; safe to call more than once
	async fn close(&self);
}

/// Builds the event source of the provider's network
///
/// # Errors
/// * `ConfigurationError` - a push network without WebSocket endpoint, or an
///   unusable RPC endpoint
pub fn create_event_source(
	provider: &Provider,
	config: &ListenerConfig,
) -> Result<Arc<dyn EventSource>, ListenerError> {
	let ws_url = || {
		provider.ws_url().map(str::to_string).ok_or_else(|| {
			ListenerError::configuration_error(format!(
				"{} networks need a WebSocket endpoint",
				provider.network()
			))
		})
	};
	let auth_token = provider.auth_token().map(str::to_string);

	let source: Arc<dyn EventSource> = match provider.network() {
		NetworkKind::Ledger => Arc::new(LedgerSource::new(
			ws_url()?,
			auth_token,
			provider.ws_pool().clone(),
		)),
		NetworkKind::Evm => {
			let client = EvmClient::new(provider.rpc_url(), auth_token.clone())
				.map_err(|e| ListenerError::configuration_error(e.to_string()))?;
			Arc::new(EvmSource::new(
				ws_url()?,
				auth_token,
				provider.ws_pool().clone(),
				Arc::new(client),
			))
		}
		NetworkKind::Utxo => {
			let client = UtxoClient::new(provider.rpc_url(), auth_token)
				.map_err(|e| ListenerError::configuration_error(e.to_string()))?;
			Arc::new(UtxoSource::new(Arc::new(client), config.poll_interval))
		}
	};
	Ok(source)
}
