//! Construction of the chain client matching a network kind.

use std::sync::Arc;

use crate::{
	models::NetworkKind,
	services::blockchain::{
		client::ChainClient,
		clients::{EvmClient, LedgerClient, UtxoClient},
		BlockChainError,
	},
};

/// Creates the chain client for `network`
///
/// # Arguments
/// * `network` - Network family
/// * `rpc_url` - JSON-RPC endpoint, or the REST base URL for UTXO chains
/// * `auth_token` - Optional bearer token
pub fn create_chain_client(
	network: NetworkKind,
	rpc_url: &str,
	auth_token: Option<String>,
) -> Result<Arc<dyn ChainClient>, BlockChainError> {
	let client: Arc<dyn ChainClient> = match network {
		NetworkKind::Evm => Arc::new(EvmClient::new(rpc_url, auth_token)?),
		NetworkKind::Ledger => Arc::new(LedgerClient::new(rpc_url, auth_token)?),
		NetworkKind::Utxo => Arc::new(UtxoClient::new(rpc_url, auth_token)?),
	};
	Ok(client)
}
