//! Common interface of chain clients.

use async_trait::async_trait;
use serde_json::Value;

use crate::{
	models::{NetworkKind, TransactionStatus},
	services::blockchain::BlockChainError,
};

/// Read access to transactions of one network
///
/// Implementations must report a transaction the node does not know as
/// [`BlockChainError::NotFound`], and only then.
#[async_trait]
pub trait ChainClient: Send + Sync {
	fn network(&self) -> NetworkKind;

	/// Full transaction document as returned by the node
	async fn get_transaction(&self, id: &str) -> Result<Value, BlockChainError>;

	/// Current finality status, read from the node every time
	async fn get_transaction_status(&self, id: &str) -> Result<TransactionStatus, BlockChainError>;

	/// Decimals of a fungible token contract
	async fn get_token_decimals(&self, address: &str) -> Result<u32, BlockChainError> {
		Err(BlockChainError::internal_error(format!(
			"Token decimals of {} cannot be read on {} networks",
			address,
			self.network()
		)))
	}

	/// Cheap request proving the endpoint answers
	async fn check_connection(&self) -> Result<(), BlockChainError>;
}
