//! Network provider.
//!
//! A [`Provider`] is the context object a listener is built from. It knows the
//! endpoints of one network, derived from the testnet flag unless overridden, and
//! owns the pool through which push listeners share WebSocket connections.

mod error;
mod registry;

pub use error::ProviderError;
pub use registry::{default_registry, ProviderRegistry};

use std::sync::Arc;

use crate::{
	models::{NetworkConfig, NetworkKind},
	services::blockchain::{create_chain_client, ChainClient, WsConfig, WsConnection, WsConnectionPool},
	utils::http::join_url,
};

/// Endpoints derived for a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
	/// JSON-RPC endpoint, or REST base URL on UTXO chains
	pub rpc_url: String,
	/// Block explorer for humans
	pub explorer_url: String,
	pub ws_url: Option<String>,
}

struct DefaultEndpoints {
	rpc: &'static str,
	ws: &'static str,
	explorer: &'static str,
}

fn default_endpoints(network: NetworkKind, testnet: bool) -> DefaultEndpoints {
	match (network, testnet) {
		(NetworkKind::Evm, false) => DefaultEndpoints {
			rpc: "https://ethereum-rpc.publicnode.com",
			ws: "wss://ethereum-rpc.publicnode.com",
			explorer: "https://etherscan.io",
		},
		(NetworkKind::Evm, true) => DefaultEndpoints {
			rpc: "https://ethereum-sepolia-rpc.publicnode.com",
			ws: "wss://ethereum-sepolia-rpc.publicnode.com",
			explorer: "https://sepolia.etherscan.io",
		},
		(NetworkKind::Ledger, false) => DefaultEndpoints {
			rpc: "https://xrplcluster.com",
			ws: "wss://xrplcluster.com",
			explorer: "https://livenet.xrpl.org",
		},
		(NetworkKind::Ledger, true) => DefaultEndpoints {
			rpc: "https://s.altnet.rippletest.net:51234",
			ws: "wss://s.altnet.rippletest.net:51233",
			explorer: "https://testnet.xrpl.org",
		},
		(NetworkKind::Utxo, false) => DefaultEndpoints {
			rpc: "https://blockstream.info/api",
			ws: "wss://mempool.space/api/v1/ws",
			explorer: "https://blockstream.info",
		},
		(NetworkKind::Utxo, true) => DefaultEndpoints {
			rpc: "https://blockstream.info/testnet/api",
			ws: "wss://mempool.space/testnet/api/v1/ws",
			explorer: "https://blockstream.info/testnet",
		},
	}
}

fn check_endpoint(endpoint: &str, schemes: [&str; 2]) -> Result<(), ProviderError> {
	let url = url::Url::parse(endpoint)
		.map_err(|e| ProviderError::invalid_endpoint(format!("{}: {}", endpoint, e)))?;
	if !schemes.contains(&url.scheme()) {
		return Err(ProviderError::invalid_endpoint(format!(
			"{} must use one of {:?}",
			endpoint, schemes
		)));
	}
	Ok(())
}

fn derive_endpoints(network: NetworkKind, config: &NetworkConfig) -> Result<Endpoints, ProviderError> {
	let defaults = default_endpoints(network, config.testnet);

	if let Some(rpc) = &config.rpc_endpoint {
		check_endpoint(rpc, ["http", "https"])?;
	}
	if let Some(ws) = &config.ws_endpoint {
		check_endpoint(ws, ["ws", "wss"])?;
	}

	Ok(Endpoints {
		rpc_url: config
			.rpc_endpoint
			.clone()
			.unwrap_or_else(|| defaults.rpc.to_string()),
		explorer_url: defaults.explorer.to_string(),
		ws_url: Some(
			config
				.ws_endpoint
				.clone()
				.unwrap_or_else(|| defaults.ws.to_string()),
		),
	})
}

/// Endpoints and shared connections of one network
#[derive(Clone)]
pub struct Provider {
	network: NetworkKind,
	config: NetworkConfig,
	endpoints: Endpoints,
	ws_pool: Arc<WsConnectionPool>,
}

impl Provider {
	/// Creates a provider with its own connection pool
	///
	/// # Errors
	/// * `ProviderError::InvalidEndpoint` - An explicit endpoint is malformed
	pub fn new(network: NetworkKind, config: NetworkConfig) -> Result<Self, ProviderError> {
		Self::with_ws_config(network, config, WsConfig::default())
	}

	pub fn with_ws_config(
		network: NetworkKind,
		config: NetworkConfig,
		ws_config: WsConfig,
	) -> Result<Self, ProviderError> {
		Self::with_pool(network, config, Arc::new(WsConnectionPool::new(ws_config)))
	}

	/// Creates a provider sharing an existing connection pool
	pub fn with_pool(
		network: NetworkKind,
		config: NetworkConfig,
		ws_pool: Arc<WsConnectionPool>,
	) -> Result<Self, ProviderError> {
		let endpoints = derive_endpoints(network, &config)?;
		tracing::debug!(%network, rpc = %endpoints.rpc_url, ws = ?endpoints.ws_url, "Provider configured");
		Ok(Self {
			network,
			config,
			endpoints,
			ws_pool,
		})
	}

	/// Replaces the configuration and re-derives every endpoint
	///
	/// On error the provider keeps its previous configuration.
	pub fn update(&mut self, config: NetworkConfig) -> Result<(), ProviderError> {
		self.endpoints = derive_endpoints(self.network, &config)?;
		self.config = config;
		Ok(())
	}

	pub fn network(&self) -> NetworkKind {
		self.network
	}

	pub fn config(&self) -> &NetworkConfig {
		&self.config
	}

	pub fn endpoints(&self) -> &Endpoints {
		&self.endpoints
	}

	pub fn rpc_url(&self) -> &str {
		&self.endpoints.rpc_url
	}

	pub fn explorer_url(&self) -> &str {
		&self.endpoints.explorer_url
	}

	pub fn ws_url(&self) -> Option<&str> {
		self.endpoints.ws_url.as_deref()
	}

	pub fn auth_token(&self) -> Option<&str> {
		self.config.auth_token.as_deref()
	}

	pub fn ws_pool(&self) -> &Arc<WsConnectionPool> {
		&self.ws_pool
	}

	/// Joins the RPC base URL and `path` with exactly one `/`
	pub fn rest_endpoint(&self, path: &str) -> String {
		join_url(&self.endpoints.rpc_url, path)
	}

	pub fn chain_client(&self) -> Result<Arc<dyn ChainClient>, ProviderError> {
		create_chain_client(
			self.network,
			&self.endpoints.rpc_url,
			self.config.auth_token.clone(),
		)
		.map_err(|e| ProviderError::invalid_endpoint(e.to_string()))
	}

	/// Sends a cheap request to the RPC endpoint
	///
	/// # Arguments
	/// * `url` - Endpoint to probe instead of the configured one
	pub async fn check_rpc_connection(&self, url: Option<&str>) -> Result<(), ProviderError> {
		let url = url.unwrap_or(&self.endpoints.rpc_url);
		let client = create_chain_client(self.network, url, self.config.auth_token.clone())
			.map_err(|e| ProviderError::invalid_endpoint(e.to_string()))?;
		client
			.check_connection()
			.await
			.map_err(|e| ProviderError::connection_error(format!("{}: {}", url, e)))
	}

	/// Opens a WebSocket to the endpoint within the connection timeout, then closes it
	///
	/// # Arguments
	/// * `url` - Endpoint to probe instead of the configured one
	pub async fn check_ws_connection(&self, url: Option<&str>) -> Result<(), ProviderError> {
		let url = url
			.or(self.endpoints.ws_url.as_deref())
			.ok_or_else(|| ProviderError::invalid_endpoint("No WebSocket endpoint configured"))?;
		let connection = WsConnection::connect(url, self.auth_token(), self.ws_pool.config())
			.await
			.map_err(|e| ProviderError::connection_error(format!("{}: {}", url, e)))?;
		connection.close().await;
		Ok(())
	}
}

impl std::fmt::Debug for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("network", &self.network)
			.field("config", &self.config)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}
