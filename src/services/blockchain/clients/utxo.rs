//! Client for UTXO chains behind an Esplora REST API.

use async_trait::async_trait;
use serde_json::Value;

use crate::{
	models::{NetworkKind, TransactionStatus},
	services::blockchain::{
		client::ChainClient,
		transports::{BlockchainTransport, HttpTransportClient, TransportError},
		BlockChainError,
	},
};

#[derive(Clone, Debug)]
pub struct UtxoClient<T = HttpTransportClient> {
	transport: T,
}

impl<T: BlockchainTransport> UtxoClient<T> {
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}

	async fn get(&self, path: &str, id: &str) -> Result<Value, BlockChainError> {
		match self.transport.get_json(path).await {
			Ok(value) => Ok(value),
			Err(TransportError::Http { status: 404, .. }) => Err(BlockChainError::not_found(id)),
			Err(e) => Err(e.into()),
		}
	}

	/// Latest transactions touching `address`, newest first
	///
	/// Errors are returned untouched so that callers can tell throttling apart.
	pub async fn get_address_transactions(&self, address: &str) -> Result<Vec<Value>, TransportError> {
		match self.transport.get_json(&format!("address/{}/txs", address)).await? {
			Value::Array(transactions) => Ok(transactions),
			other => Err(TransportError::response_parse(format!(
				"Expected a transaction list for {}, got {}",
				address, other
			))),
		}
	}

	/// Height of the chain tip, the cheapest read the API offers
	pub async fn tip_height(&self) -> Result<u64, TransportError> {
		let height = self.transport.get_text("blocks/tip/height").await?;
		height.trim().parse::<u64>().map_err(|_| {
			TransportError::response_parse(format!("Unexpected tip height: {}", height.trim()))
		})
	}
}

impl UtxoClient<HttpTransportClient> {
	pub fn new(rest_url: &str, auth_token: Option<String>) -> Result<Self, BlockChainError> {
		Ok(Self::new_with_transport(HttpTransportClient::new(
			rest_url, auth_token,
		)?))
	}
}

#[async_trait]
impl<T: BlockchainTransport> ChainClient for UtxoClient<T> {
	fn network(&self) -> NetworkKind {
		NetworkKind::Utxo
	}

	async fn get_transaction(&self, id: &str) -> Result<Value, BlockChainError> {
		self.get(&format!("tx/{}", id), id).await
	}

	async fn get_transaction_status(&self, id: &str) -> Result<TransactionStatus, BlockChainError> {
		let status = self.get(&format!("tx/{}/status", id), id).await?;
		if status.get("confirmed").and_then(Value::as_bool) == Some(true) {
			Ok(TransactionStatus::Confirmed)
		} else {
			Ok(TransactionStatus::Pending)
		}
	}

	async fn check_connection(&self) -> Result<(), BlockChainError> {
		self.tip_height().await?;
		Ok(())
	}
}
