//! Chain client implementations, one per network family.

mod evm;
mod ledger;
mod utxo;

pub use evm::EvmClient;
pub use ledger::LedgerClient;
pub use utxo::UtxoClient;

use serde_json::Value;

use crate::services::blockchain::BlockChainError;

/// Unwraps the `result` member of a JSON-RPC 2.0 response
pub(crate) fn json_rpc_result(response: Value) -> Result<Value, BlockChainError> {
	if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
		let message = error
			.get("message")
			.and_then(Value::as_str)
			.map(str::to_string)
			.unwrap_or_else(|| error.to_string());
		return Err(BlockChainError::request_error(message));
	}

	match response {
		Value::Object(mut object) => object
			.remove("result")
			.ok_or_else(|| BlockChainError::request_error("Response has no result")),
		other => Err(BlockChainError::request_error(format!(
			"Unexpected JSON-RPC response: {}",
			other
		))),
	}
}
