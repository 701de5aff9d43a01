//! Mock implementations and test servers.
//!
//! - [`MockChainClient`] / [`MockEventSource`] - mockall doubles of the core traits
//! - [`ChannelSource`] - event source fed by the test through a channel
//! - [`TestWsServer`] - in-process WebSocket node answering subscribe commands


pub use servers::*;
pub use sources::*;

use async_trait::async_trait;
use chain_listener::{
	models::{NetworkKind, TransactionStatus},
	services::{
		blockchain::{BlockChainError, ChainClient, TransportError},
		listener::ListenerError,
		matcher::SubscriptionPlan,
		source::{EventSource, RecordStream},
	},
};
use mockall::mock;
use serde_json::Value;
use std::time::Duration;

mock! {
	/// Chain client returning scripted transaction documents and statuses
	pub ChainClient {}

	#[async_trait]
	impl ChainClient for ChainClient {
		fn network(&self) -> NetworkKind;
		async fn get_transaction(&self, id: &str) -> Result<Value, BlockChainError>;
		async fn get_transaction_status(&self, id: &str) -> Result<TransactionStatus, BlockChainError>;
		async fn get_token_decimals(&self, address: &str) -> Result<u32, BlockChainError>;
		async fn check_connection(&self) -> Result<(), BlockChainError>;
	}
}

mock! {
	/// Event source with scripted connect/open/close behaviour
	pub EventSource {}

	#[async_trait]
	impl EventSource for EventSource {
		fn network(&self) -> NetworkKind;
		async fn connect(&self) -> Result<(), TransportError>;
		async fn open(&self, plan: &SubscriptionPlan) -> Result<RecordStream, ListenerError>;
		async fn close(&self);
	}
}

/// Polls `condition` every 10ms for up to 3 seconds
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
	for _ in 0..300 {
		if condition() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	condition()
}
