//! Push source for EVM nodes (`eth_subscribe`).
//!
//! Log subscriptions forward every notification as it arrives. Head subscriptions are
//! expanded into the block's full transactions over HTTP, since heads alone carry no
//! transfer data.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::{json, Map, Value};
use std::{
	sync::{Arc, Mutex as StdMutex, PoisonError},
	time::Duration,
};

use super::{
	push::{pushed_error, pushed_messages, PooledConnection},
	EventSource, RecordStream,
};
use crate::{
	models::{NetworkKind, RawFeedRecord},
	services::{
		blockchain::{BlockChainError, EvmClient, TransportError, WsConnectionPool},
		listener::{FeedError, ListenerError},
		matcher::{SubscriptionPlan, SubscriptionRequest},
	},
	utils::{RetryConfig, WithRetry},
};

const BLOCK_FETCH_RETRIES: u32 = 3;
const BLOCK_FETCH_DELAY: Duration = Duration::from_millis(500);

pub struct EvmSource {
	connection: PooledConnection,
	client: Arc<EvmClient>,
	/// Id assigned by the node, needed to unsubscribe
	subscription: StdMutex<Option<String>>,
}

impl EvmSource {
	pub fn new(
		url: String,
		auth_token: Option<String>,
		pool: Arc<WsConnectionPool>,
		client: Arc<EvmClient>,
	) -> Self {
		Self {
			connection: PooledConnection::new(url, auth_token, pool),
			client,
			subscription: StdMutex::new(None),
		}
	}

	fn subscribe_params(request: &SubscriptionRequest) -> Option<Value> {
		match request {
			SubscriptionRequest::EvmHeads => Some(json!(["newHeads"])),
			SubscriptionRequest::EvmLogs { address, topics } => {
				let mut filter = Map::new();
				if let Some(address) = address {
					filter.insert("address".into(), json!(address));
				}
				if !topics.is_empty() {
					filter.insert("topics".into(), json!(topics));
				}
				Some(json!(["logs", filter]))
			}
			_ => None,
		}
	}
}

/// `result` of an `eth_subscription` notification addressed to `subscription`
fn notification_result(message: &Value, subscription: &str) -> Option<Value> {
	if message.get("method").and_then(Value::as_str) != Some("eth_subscription") {
		return None;
	}
	let params = message.get("params")?;
	if params.get("subscription").and_then(Value::as_str) != Some(subscription) {
		return None;
	}
	params.get("result").cloned()
}

async fn expand_head(client: Arc<EvmClient>, head: Value) -> Vec<Result<RawFeedRecord, FeedError>> {
	let Some(hash) = head.get("hash").and_then(Value::as_str) else {
		return vec![Err(FeedError::Decode("block header without hash".to_string()))];
	};

	let retry = WithRetry::new(RetryConfig::fixed(BLOCK_FETCH_RETRIES, BLOCK_FETCH_DELAY));
	let transactions = retry
		.attempt_if(|| client.get_block_transactions(hash), BlockChainError::is_not_found)
		.await;

	match transactions {
		Ok(transactions) => transactions
			.into_iter()
			.map(|tx| Ok(RawFeedRecord::new(NetworkKind::Evm, tx)))
			.collect(),
		Err(e) => vec![Err(FeedError::Transport(format!("block {}: {}", hash, e)))],
	}
}

#[async_trait]
impl EventSource for EvmSource {
	fn network(&self) -> NetworkKind {
		NetworkKind::Evm
	}

	async fn connect(&self) -> Result<(), TransportError> {
		self.connection.acquire().await.map(|_| ())
	}

	async fn open(&self, plan: &SubscriptionPlan) -> Result<RecordStream, ListenerError> {
		let params = Self::subscribe_params(&plan.request).ok_or_else(|| {
			ListenerError::configuration_error(format!("evm source cannot serve {:?}", plan.request))
		})?;

		let connection = self
			.connection
			.acquire()
			.await
			.map_err(|e| ListenerError::connection_unavailable(e.to_string()))?;
		let receiver = connection
			.subscribe_events()
			.map_err(|e| ListenerError::connection_unavailable(e.to_string()))?;

		let command = json!({
			"jsonrpc": "2.0",
			"id": plan.id,
			"method": "eth_subscribe",
			"params": params,
		});
		let response = connection.command(command).await.map_err(|e| match e {
			TransportError::Closed => ListenerError::connection_unavailable(e.to_string()),
			e => ListenerError::subscription_error(e.to_string()),
		})?;
		if let Some(error) = pushed_error(&response) {
			return Err(ListenerError::subscription_error(error));
		}
		let subscription = response
			.get("result")
			.and_then(Value::as_str)
			.map(str::to_string)
			.ok_or_else(|| {
				ListenerError::subscription_error(format!("eth_subscribe returned {}", response))
			})?;

		tracing::info!(id = %plan.id, %subscription, url = %self.connection.url(), "EVM subscription active");
		*self
			.subscription
			.lock()
			.unwrap_or_else(PoisonError::into_inner) = Some(subscription.clone());

		let results = pushed_messages(receiver).filter_map(move |message| {
			let item = match message {
				Ok(message) => match pushed_error(&message) {
					Some(error) if message.get("id").is_none() => {
						Some(Err(FeedError::from_pushed_error(error)))
					}
					_ => notification_result(&message, &subscription).map(Ok),
				},
				Err(e) => Some(Err(e)),
			};
			futures::future::ready(item)
		});

		let stream = if plan.request == SubscriptionRequest::EvmHeads {
			let client = self.client.clone();
			results
				.then(move |head| {
					let client = client.clone();
					async move {
						match head {
							Ok(head) => expand_head(client, head).await,
							Err(e) => vec![Err(e)],
						}
					}
				})
				.flat_map(stream::iter)
				.boxed()
		} else {
			results
				.map(|log| log.map(|log| RawFeedRecord::new(NetworkKind::Evm, log)))
				.boxed()
		};
		Ok(stream)
	}

	async fn close(&self) {
		let subscription = self
			.subscription
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
		if let (Some(subscription), Some(connection)) = (subscription, self.connection.current().await) {
			if connection.is_healthy() {
				let command = json!({
					"jsonrpc": "2.0",
					"id": format!("unsubscribe-{}", subscription),
					"method": "eth_unsubscribe",
					"params": [subscription],
				});
				if let Err(e) = connection.command(command).await {
					tracing::warn!(%subscription, error = %e, "eth_unsubscribe failed");
				}
			}
		}
		self.connection.release().await;
	}
}
