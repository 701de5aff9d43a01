//! Pool of shared WebSocket connections, keyed by URL.
//!
//! Every listener on the same endpoint shares one connection. Callers take a lease
//! with [`WsConnectionPool::acquire`] and give it back with
//! [`WsConnectionPool::release`]; the last release closes the socket.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::{
	services::blockchain::transports::{
		ws::{WsConfig, WsConnection},
		TransportError,
	},
	utils::{RetryConfig, WithRetry},
};

struct PoolEntry {
	connection: Arc<WsConnection>,
	leases: usize,
}

#[derive(Default)]
pub struct WsConnectionPool {
	config: WsConfig,
	entries: Mutex<HashMap<String, PoolEntry>>,
}

impl WsConnectionPool {
	pub fn new(config: WsConfig) -> Self {
		Self {
			config,
			entries: Mutex::new(HashMap::new()),
		}
	}

	pub fn config(&self) -> &WsConfig {
		&self.config
	}

	/// Returns the pooled connection for `url`, dialing it first when needed
	///
	/// A dead pooled connection is replaced. Dialing makes up to
	/// `max_reconnect_attempts` attempts, `reconnect_timeout` apart.
	///
	/// # Arguments
	/// * `url` - WebSocket endpoint
	/// * `auth_token` - Bearer token for the handshake of a new connection
	///
	/// # Returns
	/// * `Result<Arc<WsConnection>, TransportError>` - A leased connection
	pub async fn acquire(
		&self,
		url: &str,
		auth_token: Option<&str>,
	) -> Result<Arc<WsConnection>, TransportError> {
		// Held while dialing so that concurrent acquirers share one connection
		let mut entries = self.entries.lock().await;

		if let Some(entry) = entries.get_mut(url) {
			if entry.connection.is_healthy() {
				entry.leases += 1;
				return Ok(entry.connection.clone());
			}
		}
		if let Some(stale) = entries.remove(url) {
			tracing::info!(url, leases = stale.leases, "Replacing dead WebSocket connection");
			stale.connection.close().await;
		}

		let retry = WithRetry::new(RetryConfig::fixed(
			self.config.max_reconnect_attempts.saturating_sub(1),
			self.config.reconnect_timeout,
		));
		let connection = retry
			.attempt(|| WsConnection::connect(url, auth_token, &self.config))
			.await?;
		let connection = Arc::new(connection);

		entries.insert(
			url.to_string(),
			PoolEntry {
				connection: connection.clone(),
				leases: 1,
			},
		);
		Ok(connection)
	}

	/// Gives back a lease taken by [`Self::acquire`]
	///
	/// Releasing a connection that has already been replaced in the pool is a no-op.
	pub async fn release(&self, url: &str, connection: &Arc<WsConnection>) {
		let mut entries = self.entries.lock().await;
		let Some(entry) = entries.get_mut(url) else {
			return;
		};
		if !Arc::ptr_eq(&entry.connection, connection) {
			return;
		}

		entry.leases = entry.leases.saturating_sub(1);
		if entry.leases == 0 {
			if let Some(entry) = entries.remove(url) {
				entry.connection.close().await;
			}
		}
	}

	/// Number of leases currently held on `url`
	pub async fn lease_count(&self, url: &str) -> usize {
		self.entries
			.lock()
			.await
			.get(url)
			.map(|entry| entry.leases)
			.unwrap_or(0)
	}

	pub async fn len(&self) -> usize {
		self.entries.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.lock().await.is_empty()
	}
}
