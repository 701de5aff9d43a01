//! A shared duplex WebSocket connection.
//!
//! One reader task owns the receiving half. Messages whose `id` matches a pending
//! command complete that command; every other message is fanned out to all
//! subscribers through a broadcast channel. Commands are serialized per connection,
//! so two callers can reuse the same `id` without stealing each other's response.

use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde_json::Value;
use std::{
	collections::HashMap,
	fmt,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex as StdMutex, PoisonError,
	},
	time::Duration,
};
use tokio::{
	net::TcpStream,
	sync::{broadcast, oneshot, Mutex, MutexGuard},
	task::JoinHandle,
	time::{timeout, MissedTickBehavior},
};
use tokio_tungstenite::{
	connect_async,
	tungstenite::{client::IntoClientRequest, http::HeaderValue, Message},
	MaybeTlsStream, WebSocketStream,
};

use crate::services::blockchain::transports::{ws::WsConfig, TransportError};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Key used to correlate a response with its command
///
/// Both string and numeric ids are accepted; numbers are rendered in decimal.
pub fn message_id(message: &Value) -> Option<String> {
	match message.get("id")? {
		Value::String(id) => Some(id.clone()),
		Value::Number(id) => Some(id.to_string()),
		_ => None,
	}
}

/// State shared between the connection handle and its background tasks
struct Inbox {
	pending: StdMutex<HashMap<String, oneshot::Sender<Value>>>,
	events: StdMutex<Option<broadcast::Sender<Arc<Value>>>>,
	healthy: AtomicBool,
}

impl Inbox {
	fn dispatch(&self, text: &str) {
		let message: Value = match serde_json::from_str(text) {
			Ok(message) => message,
			Err(e) => {
				tracing::warn!(error = %e, "Discarding WebSocket message that is not JSON");
				return;
			}
		};

		if let Some(id) = message_id(&message) {
			let waiter = self
				.pending
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.remove(&id);
			if let Some(waiter) = waiter {
				let _ = waiter.send(message);
				return;
			}
		}

		let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(sender) = events.as_ref() {
			// No subscriber is not an error
			let _ = sender.send(Arc::new(message));
		}
	}

	/// Marks the connection dead, fails pending commands and ends every subscription
	fn shut_down(&self) {
		self.healthy.store(false, Ordering::SeqCst);
		self.pending
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
		self.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
	}
}

/// Handle of a live WebSocket connection
pub struct WsConnection {
	url: String,
	config: WsConfig,
	sink: Arc<Mutex<WsSink>>,
	inbox: Arc<Inbox>,
	command_lock: Mutex<()>,
	subscription_lock: Mutex<()>,
	topics: StdMutex<HashMap<String, usize>>,
	tasks: StdMutex<Vec<JoinHandle<()>>>,
}

impl WsConnection {
	/// Dials `url` once
	///
	/// # Arguments
	/// * `url` - `ws(s)://` endpoint
	/// * `auth_token` - Sent as `Authorization: Bearer <token>` during the handshake
	/// * `config` - Timeouts, heartbeat interval and channel capacity
	pub async fn connect(
		url: &str,
		auth_token: Option<&str>,
		config: &WsConfig,
	) -> Result<Self, TransportError> {
		let mut request = url.into_client_request()?;
		if let Some(token) = auth_token {
			let value = HeaderValue::from_str(&format!("Bearer {}", token))
				.map_err(|e| TransportError::network(format!("Invalid auth token: {}", e)))?;
			request.headers_mut().insert("Authorization", value);
		}

		let (stream, _) = timeout(config.connection_timeout, connect_async(request))
			.await
			.map_err(|_| TransportError::timeout(format!("Connecting to {}", url)))??;
		tracing::debug!(url, "WebSocket connected");

		let (sink, mut reader) = stream.split();
		let (events, _) = broadcast::channel(config.channel_capacity.max(1));
		let inbox = Arc::new(Inbox {
			pending: StdMutex::new(HashMap::new()),
			events: StdMutex::new(Some(events)),
			healthy: AtomicBool::new(true),
		});
		let sink = Arc::new(Mutex::new(sink));

		let reader_inbox = inbox.clone();
		let reader_url = url.to_string();
		let reader_task = tokio::spawn(async move {
			while let Some(message) = reader.next().await {
				match message {
					Ok(Message::Text(text)) => reader_inbox.dispatch(&text),
					Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
						Ok(text) => reader_inbox.dispatch(text),
						Err(_) => tracing::warn!(url = %reader_url, "Discarding binary message"),
					},
					Ok(Message::Close(frame)) => {
						tracing::info!(url = %reader_url, ?frame, "WebSocket closed by server");
						break;
					}
					Ok(_) => {}
					Err(e) => {
						tracing::warn!(url = %reader_url, error = %e, "WebSocket read failed");
						break;
					}
				}
			}
			reader_inbox.shut_down();
		});

		let heartbeat_task = tokio::spawn(heartbeat(
			sink.clone(),
			inbox.clone(),
			config.heartbeat_interval,
			url.to_string(),
		));

		Ok(Self {
			url: url.to_string(),
			config: config.clone(),
			sink,
			inbox,
			command_lock: Mutex::new(()),
			subscription_lock: Mutex::new(()),
			topics: StdMutex::new(HashMap::new()),
			tasks: StdMutex::new(vec![reader_task, heartbeat_task]),
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn is_healthy(&self) -> bool {
		self.inbox.healthy.load(Ordering::SeqCst)
	}

	/// Receives every pushed message that is not a command response
	///
	/// The receiver ends with `Closed` once the connection dies.
	pub fn subscribe_events(&self) -> Result<broadcast::Receiver<Arc<Value>>, TransportError> {
		self.inbox
			.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.as_ref()
			.map(|sender| sender.subscribe())
			.ok_or(TransportError::Closed)
	}

	/// Sends a JSON message without waiting for an answer
	pub async fn send(&self, message: &Value) -> Result<(), TransportError> {
		if !self.is_healthy() {
			return Err(TransportError::Closed);
		}
		let mut sink = self.sink.lock().await;
		sink.send(Message::Text(message.to_string().into()))
			.await
			.map_err(|e| {
				self.inbox.shut_down();
				TransportError::from(e)
			})
	}

	/// Sends a command and waits for the message carrying the same `id`
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - The raw response; protocol level errors
	///   inside it are left to the caller
	pub async fn command(&self, command: Value) -> Result<Value, TransportError> {
		let id = message_id(&command)
			.ok_or_else(|| TransportError::network("Command without an id cannot be correlated"))?;
		let wait = self.config.message_timeout;

		let _turn = timeout(wait, self.command_lock.lock())
			.await
			.map_err(|_| TransportError::timeout(format!("Waiting to send command {}", id)))?;

		let (tx, rx) = oneshot::channel();
		self.inbox
			.pending
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(id.clone(), tx);

		if let Err(e) = self.send(&command).await {
			self.forget(&id);
			return Err(e);
		}

		match timeout(wait, rx).await {
			Ok(Ok(response)) => Ok(response),
			Ok(Err(_)) => Err(TransportError::Closed),
			Err(_) => {
				self.forget(&id);
				Err(TransportError::timeout(format!("No response to command {}", id)))
			}
		}
	}

	fn forget(&self, id: &str) {
		self.inbox
			.pending
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(id);
	}

	/// Serialises topic bookkeeping with the command that makes it true on the node
	///
	/// Hold the guard from [`Self::retain_topics`] or [`Self::release_topics`] until the
	/// matching subscribe or unsubscribe command is answered, so that no other holder
	/// treats a topic as live before the node confirmed it.
	pub async fn lock_subscriptions(&self) -> MutexGuard<'_, ()> {
		self.subscription_lock.lock().await
	}

	/// Takes a reference on each topic
	///
	/// # Returns
	/// The topics nobody referenced before, which still have to be subscribed
	pub fn retain_topics(&self, topics: &[String]) -> Vec<String> {
		let mut counts = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
		topics
			.iter()
			.filter(|topic| {
				let count = counts.entry((*topic).clone()).or_insert(0);
				*count += 1;
				*count == 1
			})
			.cloned()
			.collect()
	}

	/// Drops a reference on each topic
	///
	/// # Returns
	/// The topics that lost their last reference and can be unsubscribed
	pub fn release_topics(&self, topics: &[String]) -> Vec<String> {
		let mut counts = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
		let mut released = Vec::new();
		for topic in topics {
			if let Some(count) = counts.get_mut(topic) {
				*count -= 1;
				if *count == 0 {
					counts.remove(topic);
					released.push(topic.clone());
				}
			}
		}
		released
	}

	/// Closes the socket and stops the background tasks
	pub async fn close(&self) {
		let was_healthy = self.inbox.healthy.swap(false, Ordering::SeqCst);
		if was_healthy {
			let mut sink = self.sink.lock().await;
			let _ = timeout(Duration::from_secs(1), sink.send(Message::Close(None))).await;
		}
		self.inbox.shut_down();
		for task in self
			.tasks
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.drain(..)
		{
			task.abort();
		}
		tracing::debug!(url = %self.url, "WebSocket connection closed");
	}
}

impl Drop for WsConnection {
	fn drop(&mut self) {
		for task in self
			.tasks
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.drain(..)
		{
			task.abort();
		}
	}
}

impl fmt::Debug for WsConnection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WsConnection")
			.field("url", &self.url)
			.field("healthy", &self.is_healthy())
			.finish()
	}
}

async fn heartbeat(sink: Arc<Mutex<WsSink>>, inbox: Arc<Inbox>, every: Duration, url: String) {
	let mut ticker = tokio::time::interval(every.max(Duration::from_millis(10)));
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	// The first tick completes immediately
	ticker.tick().await;

	loop {
		ticker.tick().await;
		if !inbox.healthy.load(Ordering::SeqCst) {
			break;
		}
		let result = sink.lock().await.send(Message::Ping(Vec::new().into())).await;
		if let Err(e) = result {
			tracing::warn!(%url, error = %e, "Heartbeat failed");
			inbox.shut_down();
			break;
		}
	}
}
