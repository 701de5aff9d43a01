//! Network transports used by chain clients and event sources.
//!
//! - [`HttpTransportClient`]: JSON-RPC POST and REST GET over HTTP(S)
//! - [`WsConnectionPool`]: shared duplex connections for push subscriptions

mod error;
mod http;
mod ws;

use async_trait::async_trait;
use serde_json::Value;

pub use error::TransportError;
pub use http::HttpTransportClient;
pub use ws::{message_id, WsConfig, WsConnection, WsConnectionPool};

/// Request/response transport used by chain clients
#[async_trait]
pub trait BlockchainTransport: Send + Sync {
	fn base_url(&self) -> &str;

	/// Sends a JSON-RPC request and returns the full response body
	async fn send_raw_request(&self, method: &str, params: Value) -> Result<Value, TransportError>;

	/// GET `path` relative to the base URL, parsed as JSON
	async fn get_json(&self, path: &str) -> Result<Value, TransportError>;

	/// GET `path` relative to the base URL, as text
	async fn get_text(&self, path: &str) -> Result<String, TransportError>;
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	fn base_url(&self) -> &str {
		HttpTransportClient::base_url(self)
	}

	async fn send_raw_request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
		HttpTransportClient::send_raw_request(self, method, params).await
	}

	async fn get_json(&self, path: &str) -> Result<Value, TransportError> {
		HttpTransportClient::get_json(self, path).await
	}

	async fn get_text(&self, path: &str) -> Result<String, TransportError> {
		HttpTransportClient::get_text(self, path).await
	}
}
