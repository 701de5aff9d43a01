//! HTTP transport for JSON-RPC and REST endpoints.
//!
//! Only connection failures and timeouts are retried at this level; HTTP statuses are
//! returned to the caller as [`TransportError::Http`] so that "not found" and "rate
//! limited" keep their meaning.

use reqwest_middleware::ClientWithMiddleware;
use serde_json::{json, Value};
use std::{
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
	time::Duration,
};

use crate::{
	services::blockchain::transports::TransportError,
	utils::{
		constants::DEFAULT_HTTP_TIMEOUT_MS,
		http::{create_retryable_http_client, join_url, HttpRetryConfig, TransientErrorRetryStrategy},
	},
};

/// HTTP client bound to one base URL
///
/// Cheap to clone; clones share the connection pool and the request id counter.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	client: ClientWithMiddleware,
	base_url: String,
	auth_token: Option<String>,
	request_id: Arc<AtomicU64>,
}

impl HttpTransportClient {
	/// Creates a client with the default retry policy
	///
	/// # Arguments
	/// * `base_url` - `http(s)://` URL that requests are sent to, or joined with
	/// * `auth_token` - Optional bearer token sent with every request
	pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, TransportError> {
		Self::with_retry_config(base_url, auth_token, &HttpRetryConfig::default())
	}

	pub fn with_retry_config(
		base_url: &str,
		auth_token: Option<String>,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, TransportError> {
		let parsed = url::Url::parse(base_url)
			.map_err(|e| TransportError::network(format!("Invalid URL {}: {}", base_url, e)))?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(TransportError::network(format!(
				"Unsupported scheme for HTTP transport: {}",
				base_url
			)));
		}

		let http_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.timeout(Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS))
			.connect_timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| TransportError::network(format!("Failed to create HTTP client: {}", e)))?;

		let client = create_retryable_http_client(
			retry_config,
			http_client,
			Some(TransientErrorRetryStrategy),
		);

		Ok(Self {
			client,
			base_url: base_url.to_string(),
			auth_token,
			request_id: Arc::new(AtomicU64::new(1)),
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Sends a JSON-RPC 2.0 request to the base URL
	///
	/// # Returns
	/// * `Result<Value, TransportError>` - The full response body; `error` members are
	///   left for the caller to interpret
	pub async fn send_raw_request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": self.request_id.fetch_add(1, Ordering::Relaxed),
			"method": method,
			"params": params,
		});

		tracing::trace!(method, url = %self.base_url, "Sending JSON-RPC request");
		let mut request = self.client.post(&self.base_url).json(&body);
		if let Some(token) = &self.auth_token {
			request = request.bearer_auth(token);
		}

		let response = request.send().await?;
		Self::read_json(response).await
	}

	/// Sends a GET request to `path` relative to the base URL and parses the JSON body
	pub async fn get_json(&self, path: &str) -> Result<Value, TransportError> {
		let response = self.get(path).await?;
		Self::read_json(response).await
	}

	/// Sends a GET request to `path` relative to the base URL and returns the raw body
	pub async fn get_text(&self, path: &str) -> Result<String, TransportError> {
		let response = self.get(path).await?;
		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(TransportError::http(status.as_u16(), body));
		}
		Ok(body)
	}

	async fn get(&self, path: &str) -> Result<reqwest::Response, TransportError> {
		let url = join_url(&self.base_url, path);
		tracing::trace!(%url, "Sending GET request");
		let mut request = self.client.get(&url);
		if let Some(token) = &self.auth_token {
			request = request.bearer_auth(token);
		}
		Ok(request.send().await?)
	}

	async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(TransportError::http(status.as_u16(), body));
		}
		Ok(serde_json::from_str(&body)?)
	}
}
