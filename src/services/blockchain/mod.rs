//! Chain clients and transports.
//!
//! - [`ChainClient`]: read access to transactions, one implementation per network
//! - transports: HTTP requests and shared WebSocket connections

mod client;
mod clients;
mod error;
mod factory;
mod transports;

pub use client::ChainClient;
pub use clients::{EvmClient, LedgerClient, UtxoClient};
pub use error::BlockChainError;
pub use factory::create_chain_client;
pub use transports::{
	message_id, BlockchainTransport, HttpTransportClient, TransportError, WsConfig, WsConnection,
	WsConnectionPool,
};
