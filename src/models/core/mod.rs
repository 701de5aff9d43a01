//! Core domain models for the listener.
//!
//! This module contains the fundamental data structures that represent:
//! - Networks: chain families, their capabilities and connection settings
//! - Filters: what a listener watches for, tagged by category
//! - Transactions: the finality status reported for a transaction

mod filter;
mod network;
mod transaction;

pub use filter::{
	Category, CoinFilter, ContractFilter, GeneralFilter, ListenerFilter, NftFilter, TokenFilter,
};
pub use network::{NetworkConfig, NetworkKind, NetworkProfile, TransportKind};
pub use transaction::TransactionStatus;
