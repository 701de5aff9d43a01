use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Category;

/// Supported chain families
///
/// The family decides how live events are delivered (push or poll), the precision of
/// the native coin and which listener categories make sense on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
	/// Account based chains with smart contracts, fed through `eth_subscribe`
	Evm,
	/// Ledger chains speaking the subscribe/unsubscribe command protocol
	Ledger,
	/// UTXO chains read through an Esplora style REST API
	Utxo,
}

/// How a network delivers live events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
	/// Persistent duplex connection, the node pushes records
	Push,
	/// Periodic read request compared against previously seen state
	Poll,
}

impl NetworkKind {
	pub fn transport(&self) -> TransportKind {
		match self {
			Self::Evm | Self::Ledger => TransportKind::Push,
			Self::Utxo => TransportKind::Poll,
		}
	}

	/// Number of decimals between the native coin's base unit and its display unit
	pub fn native_decimals(&self) -> u32 {
		match self {
			Self::Evm => 18,
			Self::Ledger => 6,
			Self::Utxo => 8,
		}
	}

	pub fn has_contracts(&self) -> bool {
		matches!(self, Self::Evm)
	}

	/// Whether a listener of `category` can run on this network
	pub fn supports(&self, category: Category) -> bool {
		match category {
			Category::General | Category::Coin => true,
			Category::Contract | Category::Nft => self.has_contracts(),
			// Ledger chains issue currencies natively, without contracts
			Category::Token => self.has_contracts() || matches!(self, Self::Ledger),
		}
	}
}

impl fmt::Display for NetworkKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Evm => "evm",
			Self::Ledger => "ledger",
			Self::Utxo => "utxo",
		};
		write!(f, "{}", name)
	}
}

/// Connection settings of one network
///
/// Immutable once handed to a provider; a provider update replaces it wholesale.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ws_endpoint: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rpc_endpoint: Option<String>,
	#[serde(default)]
	pub testnet: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub auth_token: Option<String>,
}

impl NetworkConfig {
	pub fn mainnet() -> Self {
		Self::default()
	}

	pub fn testnet() -> Self {
		Self {
			testnet: true,
			..Self::default()
		}
	}

	pub fn with_ws_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.ws_endpoint = Some(endpoint.into());
		self
	}

	pub fn with_rpc_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.rpc_endpoint = Some(endpoint.into());
		self
	}

	pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
		self.auth_token = Some(token.into());
		self
	}
}

impl fmt::Debug for NetworkConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NetworkConfig")
			.field("ws_endpoint", &self.ws_endpoint)
			.field("rpc_endpoint", &self.rpc_endpoint)
			.field("testnet", &self.testnet)
			.field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// A named network definition as stored in `config/networks/*.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkProfile {
	pub slug: String,
	pub network: NetworkKind,
	#[serde(flatten)]
	pub config: NetworkConfig,
}
