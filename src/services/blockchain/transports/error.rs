//! Transport level errors shared by the HTTP and WebSocket clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
	/// The request never got an answer: DNS, TCP, TLS or handshake failure
	#[error("Network error: {0}")]
	Network(String),

	/// The server answered with a non-success status
	#[error("HTTP status {status}: {body}")]
	Http { status: u16, body: String },

	#[error("Failed to parse response: {0}")]
	ResponseParse(String),

	#[error("Timed out: {0}")]
	Timeout(String),

	/// The WebSocket connection is gone
	#[error("Connection closed")]
	Closed,
}

impl TransportError {
	pub fn network(msg: impl Into<String>) -> Self {
		let error = Self::Network(msg.into());
		tracing::warn!("{}", error);
		error
	}

	/// Status codes are interpreted by callers, so they are only traced
	pub fn http(status: u16, body: impl Into<String>) -> Self {
		let error = Self::Http {
			status,
			body: body.into(),
		};
		tracing::debug!("{}", error);
		error
	}

	pub fn response_parse(msg: impl Into<String>) -> Self {
		let error = Self::ResponseParse(msg.into());
		tracing::warn!("{}", error);
		error
	}

	pub fn timeout(msg: impl Into<String>) -> Self {
		let error = Self::Timeout(msg.into());
		tracing::warn!("{}", error);
		error
	}

	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Whether the node is throttling requests
	pub fn is_rate_limited(&self) -> bool {
		self.status() == Some(429)
	}
}

impl From<reqwest_middleware::Error> for TransportError {
	fn from(err: reqwest_middleware::Error) -> Self {
		match err {
			reqwest_middleware::Error::Reqwest(e) => e.into(),
			reqwest_middleware::Error::Middleware(e) => Self::network(e.to_string()),
		}
	}
}

impl From<reqwest::Error> for TransportError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			Self::timeout(err.to_string())
		} else if err.is_decode() {
			Self::response_parse(err.to_string())
		} else {
			Self::network(err.to_string())
		}
	}
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
	fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
		use tokio_tungstenite::tungstenite::Error as WsError;
		match err {
			WsError::ConnectionClosed | WsError::AlreadyClosed => Self::Closed,
			WsError::Http(response) => {
				Self::http(response.status().as_u16(), "WebSocket handshake rejected")
			}
			other => Self::network(other.to_string()),
		}
	}
}

impl From<serde_json::Error> for TransportError {
	fn from(err: serde_json::Error) -> Self {
		Self::response_parse(err.to_string())
	}
}
