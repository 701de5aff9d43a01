//! Client for ledger chains speaking the rippled JSON-RPC dialect.
//!
//! Requests are `{"method": ..., "params": [{...}]}`; failures are reported inside
//! `result` as `{"status": "error", "error": "<code>"}` with HTTP 200.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
	models::{NetworkKind, TransactionStatus},
	services::blockchain::{
		client::ChainClient,
		transports::{BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
};

/// Error code of a transaction the server has not seen
const TXN_NOT_FOUND: &str = "txnNotFound";

const TES_SUCCESS: &str = "tesSUCCESS";

#[derive(Clone, Debug)]
pub struct LedgerClient<T = HttpTransportClient> {
	transport: T,
}

impl<T: BlockchainTransport> LedgerClient<T> {
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}

	/// `result` member of the response, error or not
	async fn call_raw(&self, method: &str, params: Value) -> Result<Value, BlockChainError> {
		let response = self.transport.send_raw_request(method, json!([params])).await?;
		response.get("result").cloned().ok_or_else(|| {
			BlockChainError::request_error(format!("{} response has no result", method))
		})
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, BlockChainError> {
		let result = self.call_raw(method, params).await?;
		check_result(method, result)
	}

	async fn lookup(&self, id: &str) -> Result<Value, BlockChainError> {
		let params = json!({ "transaction": id, "binary": false });
		let result = self.call_raw("tx", params).await?;
		if error_code(&result) == Some(TXN_NOT_FOUND) {
			return Err(BlockChainError::not_found(id));
		}
		check_result("tx", result)
	}
}

fn error_code(result: &Value) -> Option<&str> {
	result.get("error").and_then(Value::as_str)
}

fn check_result(method: &str, result: Value) -> Result<Value, BlockChainError> {
	match error_code(&result) {
		Some(code) => Err(BlockChainError::request_error(format!(
			"{} failed with {}: {}",
			method,
			code,
			result
				.get("error_message")
				.and_then(Value::as_str)
				.unwrap_or_default()
		))),
		None => Ok(result),
	}
}

impl LedgerClient<HttpTransportClient> {
	pub fn new(rpc_url: &str, auth_token: Option<String>) -> Result<Self, BlockChainError> {
		Ok(Self::new_with_transport(HttpTransportClient::new(
			rpc_url, auth_token,
		)?))
	}
}

#[async_trait]
impl<T: BlockchainTransport> ChainClient for LedgerClient<T> {
	fn network(&self) -> NetworkKind {
		NetworkKind::Ledger
	}

	async fn get_transaction(&self, id: &str) -> Result<Value, BlockChainError> {
		self.lookup(id).await
	}

	async fn get_transaction_status(&self, id: &str) -> Result<TransactionStatus, BlockChainError> {
		let transaction = self.lookup(id).await?;

		if transaction.get("validated").and_then(Value::as_bool) != Some(true) {
			return Ok(TransactionStatus::Pending);
		}

		let result = transaction
			.pointer("/meta/TransactionResult")
			.and_then(Value::as_str);
		if result == Some(TES_SUCCESS) {
			Ok(TransactionStatus::Confirmed)
		} else {
			Ok(TransactionStatus::Failed)
		}
	}

	async fn check_connection(&self) -> Result<(), BlockChainError> {
		self.call("server_info", json!({})).await.map(|_| ())
	}
}
