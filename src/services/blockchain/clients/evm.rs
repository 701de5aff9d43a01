//! Client for EVM compatible chains.

use alloy::primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
	models::{NetworkKind, TransactionStatus},
	services::blockchain::{
		client::ChainClient,
		clients::json_rpc_result,
		transports::{BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
	utils::{constants::DECIMALS_SELECTOR, units::parse_u256},
};

/// Reads EVM transactions over JSON-RPC
#[derive(Clone, Debug)]
pub struct EvmClient<T = HttpTransportClient> {
	transport: T,
}

impl<T: BlockchainTransport> EvmClient<T> {
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, BlockChainError> {
		let response = self.transport.send_raw_request(method, params).await?;
		json_rpc_result(response)
	}

	/// Transactions of the block with hash `block_hash`, as full objects
	///
	/// # Errors
	/// * `BlockChainError::NotFound` - The node does not know the block yet
	pub async fn get_block_transactions(
		&self,
		block_hash: &str,
	) -> Result<Vec<Value>, BlockChainError> {
		let block = self
			.call("eth_getBlockByHash", json!([block_hash, true]))
			.await?;
		if block.is_null() {
			return Err(BlockChainError::not_found(block_hash));
		}

		match block.get("transactions") {
			Some(Value::Array(transactions)) => Ok(transactions.clone()),
			_ => Err(BlockChainError::request_error(format!(
				"Block {} has no transaction list",
				block_hash
			))),
		}
	}
}

impl EvmClient<HttpTransportClient> {
	pub fn new(rpc_url: &str, auth_token: Option<String>) -> Result<Self, BlockChainError> {
		Ok(Self::new_with_transport(HttpTransportClient::new(
			rpc_url, auth_token,
		)?))
	}
}

#[async_trait]
impl<T: BlockchainTransport> ChainClient for EvmClient<T> {
	fn network(&self) -> NetworkKind {
		NetworkKind::Evm
	}

	async fn get_transaction(&self, id: &str) -> Result<Value, BlockChainError> {
		let transaction = self.call("eth_getTransactionByHash", json!([id])).await?;
		if transaction.is_null() {
			return Err(BlockChainError::not_found(id));
		}
		Ok(transaction)
	}

	async fn get_transaction_status(&self, id: &str) -> Result<TransactionStatus, BlockChainError> {
		let receipt = self.call("eth_getTransactionReceipt", json!([id])).await?;
		if receipt.is_null() {
			return Ok(TransactionStatus::Pending);
		}

		match receipt.get("status").and_then(Value::as_str) {
			Some(status) if parse_u256(status) == Some(U256::from(1)) => {
				Ok(TransactionStatus::Confirmed)
			}
			_ => Ok(TransactionStatus::Failed),
		}
	}

	async fn get_token_decimals(&self, address: &str) -> Result<u32, BlockChainError> {
		let result = self
			.call(
				"eth_call",
				json!([{ "to": address, "data": DECIMALS_SELECTOR }, "latest"]),
			)
			.await?;

		result
			.as_str()
			.and_then(parse_u256)
			.filter(|decimals| *decimals <= U256::from(28))
			.map(|decimals| decimals.as_limbs()[0] as u32)
			.ok_or_else(|| {
				BlockChainError::request_error(format!(
					"Unreadable decimals() of token {}: {}",
					address, result
				))
			})
	}

	async fn check_connection(&self) -> Result<(), BlockChainError> {
		self.call("eth_chainId", json!([])).await.map(|_| ())
	}
}
