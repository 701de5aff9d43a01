//! Push source for ledger nodes speaking the `subscribe`/`unsubscribe` protocol.
//!
//! Accounts and streams are reference counted on the shared connection: a listener
//! only subscribes the topics nobody else asked for yet, and on close only
//! unsubscribes the topics no other listener still needs.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use super::{
	push::{pushed_error, pushed_messages, PooledConnection},
	EventSource, RecordStream,
};
use crate::{
	models::{NetworkKind, RawFeedRecord},
	services::{
		blockchain::{TransportError, WsConnection, WsConnectionPool},
		listener::{FeedError, ListenerError},
		matcher::{SubscriptionPlan, SubscriptionRequest},
	},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopicKind {
	Accounts,
	Streams,
}

impl TopicKind {
	fn field(&self) -> &'static str {
		match self {
			Self::Accounts => "accounts",
			Self::Streams => "streams",
		}
	}

	fn key(&self, topic: &str) -> String {
		format!("{}:{}", self.field(), topic)
	}

	fn topic<'a>(&self, key: &'a str) -> &'a str {
		key.strip_prefix(self.field())
			.and_then(|rest| rest.strip_prefix(':'))
			.unwrap_or(key)
	}
}

#[derive(Debug, Clone)]
struct ActiveSubscription {
	id: String,
	kind: TopicKind,
	keys: Vec<String>,
}

pub struct LedgerSource {
	connection: PooledConnection,
	subscription: StdMutex<Option<ActiveSubscription>>,
}

impl LedgerSource {
	pub fn new(url: String, auth_token: Option<String>, pool: Arc<WsConnectionPool>) -> Self {
		Self {
			connection: PooledConnection::new(url, auth_token, pool),
			subscription: StdMutex::new(None),
		}
	}

	fn command(id: &str, command: &str, kind: TopicKind, keys: &[String]) -> Value {
		let topics: Vec<&str> = keys.iter().map(|key| kind.topic(key)).collect();
		let mut message = json!({"id": id, "command": command});
		message[kind.field()] = json!(topics);
		message
	}

	async fn send_unsubscribe(connection: &WsConnection, subscription: &ActiveSubscription) {
		let _guard = connection.lock_subscriptions().await;
		let released = connection.release_topics(&subscription.keys);
		if released.is_empty() || !connection.is_healthy() {
			return;
		}
		let command = Self::command(&subscription.id, "unsubscribe", subscription.kind, &released);
		match connection.command(command).await {
			Ok(response) => {
				if let Some(error) = pushed_error(&response) {
					tracing::warn!(id = %subscription.id, %error, "Unsubscribe rejected");
				}
			}
			Err(e) => tracing::warn!(id = %subscription.id, error = %e, "Unsubscribe failed"),
		}
	}
}

fn to_record(message: Result<Arc<Value>, FeedError>) -> Result<RawFeedRecord, FeedError> {
	let message = message?;
	if let Some(error) = pushed_error(&message) {
		return Err(FeedError::from_pushed_error(error));
	}
	Ok(RawFeedRecord::new(
		NetworkKind::Ledger,
		Arc::unwrap_or_clone(message),
	))
}

#[async_trait]
impl EventSource for LedgerSource {
	fn network(&self) -> NetworkKind {
		NetworkKind::Ledger
	}

	async fn connect(&self) -> Result<(), TransportError> {
		self.connection.acquire().await.map(|_| ())
	}

	async fn open(&self, plan: &SubscriptionPlan) -> Result<RecordStream, ListenerError> {
		let SubscriptionRequest::Ledger { streams, accounts } = &plan.request else {
			return Err(ListenerError::configuration_error(format!(
				"ledger source cannot serve {:?}",
				plan.request
			)));
		};
		let (kind, topics) = if accounts.is_empty() {
			(TopicKind::Streams, streams)
		} else {
			(TopicKind::Accounts, accounts)
		};

		let connection = self
			.connection
			.acquire()
			.await
			.map_err(|e| ListenerError::connection_unavailable(e.to_string()))?;
		// Subscribe to the fan-out before the node starts pushing
		let receiver = connection
			.subscribe_events()
			.map_err(|e| ListenerError::connection_unavailable(e.to_string()))?;

		let subscription = ActiveSubscription {
			id: plan.id.clone(),
			kind,
			keys: topics.iter().map(|topic| kind.key(topic)).collect(),
		};
		let guard = connection.lock_subscriptions().await;
		let needed = connection.retain_topics(&subscription.keys);

		if !needed.is_empty() {
			let command = Self::command(&plan.id, "subscribe", kind, &needed);
			let outcome = match connection.command(command).await {
				Ok(response) => match pushed_error(&response) {
					Some(error) => Err(ListenerError::subscription_error(error)),
					None => Ok(()),
				},
				Err(TransportError::Closed) => Err(ListenerError::connection_unavailable(
					"connection closed while subscribing",
				)),
				Err(e) => Err(ListenerError::subscription_error(e.to_string())),
			};
			if let Err(e) = outcome {
				connection.release_topics(&subscription.keys);
				return Err(e);
			}
		}
		drop(guard);

		tracing::info!(
			id = %plan.id,
			url = %self.connection.url(),
			topics = ?topics,
			shared = needed.len() < topics.len(),
			"Ledger subscription active"
		);
		*self
			.subscription
			.lock()
			.unwrap_or_else(PoisonError::into_inner) = Some(subscription);

		Ok(pushed_messages(receiver).map(to_record).boxed())
	}

	async fn close(&self) {
		let subscription = self
			.subscription
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
		if let (Some(subscription), Some(connection)) = (subscription, self.connection.current().await) {
			Self::send_unsubscribe(&connection, &subscription).await;
		}
		self.connection.release().await;
	}
}
