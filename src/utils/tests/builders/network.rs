//! Test helper utilities for network profiles
//!
//! - `NetworkProfileBuilder`: Builder for creating test `NetworkProfile` instances

use crate::models::{NetworkConfig, NetworkKind, NetworkProfile};

/// Builder for creating test network profiles
pub struct NetworkProfileBuilder {
	slug: String,
	network: NetworkKind,
	config: NetworkConfig,
}

impl Default for NetworkProfileBuilder {
	fn default() -> Self {
		Self {
			slug: "ledger_testnet".to_string(),
			network: NetworkKind::Ledger,
			config: NetworkConfig::testnet(),
		}
	}
}

impl NetworkProfileBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn slug(mut self, slug: &str) -> Self {
		self.slug = slug.to_string();
		self
	}

	pub fn network(mut self, network: NetworkKind) -> Self {
		self.network = network;
		self
	}

	pub fn mainnet(mut self) -> Self {
		self.config.testnet = false;
		self
	}

	pub fn ws_endpoint(mut self, endpoint: &str) -> Self {
		self.config.ws_endpoint = Some(endpoint.to_string());
		self
	}

	pub fn rpc_endpoint(mut self, endpoint: &str) -> Self {
		self.config.rpc_endpoint = Some(endpoint.to_string());
		self
	}

	pub fn auth_token(mut self, token: &str) -> Self {
		self.config.auth_token = Some(token.to_string());
		self
	}

	pub fn build(self) -> NetworkProfile {
		NetworkProfile {
			slug: self.slug,
			network: self.network,
			config: self.config,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_profile() {
		let profile = NetworkProfileBuilder::new().build();
		assert_eq!(profile.slug, "ledger_testnet");
		assert_eq!(profile.network, NetworkKind::Ledger);
		assert!(profile.config.testnet);
	}

	#[test]
	fn test_endpoints() {
		let profile = NetworkProfileBuilder::new()
			.network(NetworkKind::Utxo)
			.mainnet()
			.rpc_endpoint("http://localhost:3000")
			.auth_token("token")
			.build();

		assert!(!profile.config.testnet);
		assert_eq!(profile.config.rpc_endpoint.as_deref(), Some("http://localhost:3000"));
		assert_eq!(profile.config.auth_token.as_deref(), Some("token"));
	}
}
