//! Settings of shared WebSocket connections.

use std::time::Duration;

use crate::utils::constants::DEFAULT_WS_CHANNEL_CAPACITY;

/// Settings applied to every connection of a [`super::WsConnectionPool`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WsConfig {
	/// How often a keep-alive ping is sent
	pub heartbeat_interval: Duration,
	/// Pause between two dial attempts
	pub reconnect_timeout: Duration,
	/// Number of dial attempts before `acquire` gives up
	pub max_reconnect_attempts: u32,
	/// Upper bound of a single dial, handshake included
	pub connection_timeout: Duration,
	/// How long a command waits for its turn and then for its response
	pub message_timeout: Duration,
	/// Capacity of the fan-out channel of pushed messages
	pub channel_capacity: usize,
}

impl Default for WsConfig {
	fn default() -> Self {
		Self {
			heartbeat_interval: Duration::from_secs(30),
			reconnect_timeout: Duration::from_secs(5),
			max_reconnect_attempts: 3,
			connection_timeout: Duration::from_secs(10),
			message_timeout: Duration::from_secs(10),
			channel_capacity: DEFAULT_WS_CHANNEL_CAPACITY,
		}
	}
}

impl WsConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// One dial attempt and short timeouts, mostly for tests
	pub fn single_attempt() -> Self {
		Self {
			reconnect_timeout: Duration::from_millis(100),
			max_reconnect_attempts: 1,
			connection_timeout: Duration::from_secs(1),
			message_timeout: Duration::from_secs(1),
			..Self::default()
		}
	}

	pub fn with_heartbeat_interval(mut self, heartbeat_interval: Duration) -> Self {
		self.heartbeat_interval = heartbeat_interval;
		self
	}

	pub fn with_reconnect_timeout(mut self, reconnect_timeout: Duration) -> Self {
		self.reconnect_timeout = reconnect_timeout;
		self
	}

	pub fn with_max_reconnect_attempts(mut self, max_reconnect_attempts: u32) -> Self {
		self.max_reconnect_attempts = max_reconnect_attempts;
		self
	}

	pub fn with_connection_timeout(mut self, connection_timeout: Duration) -> Self {
		self.connection_timeout = connection_timeout;
		self
	}

	pub fn with_message_timeout(mut self, message_timeout: Duration) -> Self {
		self.message_timeout = message_timeout;
		self
	}

	pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
		self.channel_capacity = channel_capacity.max(1);
		self
	}
}
