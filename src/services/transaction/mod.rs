//! Transaction access for listener callbacks.
//!
//! - [`TransactionDataFetcher`]: cached, bounded-retry read of one transaction
//! - [`ListenerTransaction`]: what callbacks receive, typed by category

mod error;
mod fetcher;
mod transaction;

pub use error::TransactionError;
pub use fetcher::TransactionDataFetcher;
pub use transaction::{
	CoinTransaction, ContractTransaction, ListenerTransaction, NftTransaction, TokenTransaction,
	Transaction,
};
