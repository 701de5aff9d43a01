//! Lease on a pooled WebSocket connection and its push feed.

use futures::{stream, Stream};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, broadcast::error::RecvError, Mutex};

use crate::services::{
	blockchain::{TransportError, WsConnection, WsConnectionPool},
	listener::FeedError,
};

/// One source's lease on the shared connection of its endpoint
pub(super) struct PooledConnection {
	url: String,
	auth_token: Option<String>,
	pool: Arc<WsConnectionPool>,
	connection: Mutex<Option<Arc<WsConnection>>>,
}

impl PooledConnection {
	pub(super) fn new(url: String, auth_token: Option<String>, pool: Arc<WsConnectionPool>) -> Self {
		Self {
			url,
			auth_token,
			pool,
			connection: Mutex::new(None),
		}
	}

	pub(super) fn url(&self) -> &str {
		&self.url
	}

	/// Takes a lease unless this source already holds one
	pub(super) async fn acquire(&self) -> Result<Arc<WsConnection>, TransportError> {
		let mut slot = self.connection.lock().await;
		if let Some(connection) = slot.as_ref() {
			return Ok(connection.clone());
		}
		let connection = self
			.pool
			.acquire(&self.url, self.auth_token.as_deref())
			.await?;
		*slot = Some(connection.clone());
		Ok(connection)
	}

	pub(super) async fn current(&self) -> Option<Arc<WsConnection>> {
		self.connection.lock().await.clone()
	}

	/// Gives the lease back to the pool
	pub(super) async fn release(&self) {
		let connection = self.connection.lock().await.take();
		if let Some(connection) = connection {
			self.pool.release(&self.url, &connection).await;
		}
	}
}

/// Turns a broadcast receiver into a stream of pushed messages
///
/// A lagging receiver yields `Lagged`; a closed connection yields `Closed` once and
/// then ends the stream.
pub(super) fn pushed_messages(
	receiver: broadcast::Receiver<Arc<Value>>,
) -> impl Stream<Item = Result<Arc<Value>, FeedError>> + Send + 'static {
	stream::unfold(Some(receiver), |receiver| async move {
		let mut receiver = receiver?;
		match receiver.recv().await {
			Ok(message) => Some((Ok(message), Some(receiver))),
			Err(RecvError::Lagged(skipped)) => {
				tracing::warn!(skipped, "Push feed lagged behind the connection");
				Some((Err(FeedError::Lagged(skipped)), Some(receiver)))
			}
			Err(RecvError::Closed) => Some((Err(FeedError::Closed), None)),
		}
	})
}

/// Error text carried by a pushed message, if any
pub(super) fn pushed_error(message: &Value) -> Option<String> {
	let error = message.get("error")?;
	let text = error
		.get("message")
		.and_then(Value::as_str)
		.or_else(|| message.get("error_message").and_then(Value::as_str))
		.or_else(|| error.as_str())
		.map(str::to_string)
		.unwrap_or_else(|| error.to_string());
	Some(text)
}
