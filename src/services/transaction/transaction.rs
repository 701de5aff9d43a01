//! Transactions handed to listener callbacks.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
	models::{Category, DecodedRecord, TransactionStatus, WaitOptions},
	services::transaction::{TransactionDataFetcher, TransactionError},
};

/// A transaction observed on the feed
///
/// Cloning is cheap; clones share the cached record.
#[derive(Debug, Clone)]
pub struct Transaction {
	fetcher: TransactionDataFetcher,
}

impl Transaction {
	pub fn new(fetcher: TransactionDataFetcher) -> Self {
		Self { fetcher }
	}

	pub fn id(&self) -> &str {
		self.fetcher.id()
	}

	pub fn fetcher(&self) -> &TransactionDataFetcher {
		&self.fetcher
	}

	/// Full record from the node; read once, then served from cache
	pub async fn get_data(&self) -> Result<&Value, TransactionError> {
		self.fetcher.get_data().await
	}

	pub async fn get_status(&self) -> Result<TransactionStatus, TransactionError> {
		self.fetcher.get_status().await
	}

	pub async fn wait(&self, options: WaitOptions) -> Result<TransactionStatus, TransactionError> {
		self.fetcher.wait(options).await
	}
}

#[derive(Debug, Clone)]
pub struct ContractTransaction {
	transaction: Transaction,
	address: Option<String>,
}

impl ContractTransaction {
	pub fn transaction(&self) -> &Transaction {
		&self.transaction
	}

	/// Contract the transaction interacted with
	pub fn address(&self) -> Option<&str> {
		self.address.as_deref()
	}
}

#[derive(Debug, Clone)]
pub struct CoinTransaction {
	transaction: Transaction,
	sender: Option<String>,
	receiver: Option<String>,
	amount: Option<Decimal>,
}

impl CoinTransaction {
	pub fn transaction(&self) -> &Transaction {
		&self.transaction
	}

	pub fn sender(&self) -> Option<&str> {
		self.sender.as_deref()
	}

	pub fn receiver(&self) -> Option<&str> {
		self.receiver.as_deref()
	}

	/// Amount in display units of the native coin
	pub fn amount(&self) -> Option<Decimal> {
		self.amount
	}
}

#[derive(Debug, Clone)]
pub struct TokenTransaction {
	transaction: Transaction,
	address: Option<String>,
	sender: Option<String>,
	receiver: Option<String>,
	amount: Option<Decimal>,
}

impl TokenTransaction {
	pub fn transaction(&self) -> &Transaction {
		&self.transaction
	}

	/// Token contract, or the issuer on ledger chains
	pub fn address(&self) -> Option<&str> {
		self.address.as_deref()
	}

	pub fn sender(&self) -> Option<&str> {
		self.sender.as_deref()
	}

	pub fn receiver(&self) -> Option<&str> {
		self.receiver.as_deref()
	}

	/// Amount in display units of the token
	pub fn amount(&self) -> Option<Decimal> {
		self.amount
	}
}

#[derive(Debug, Clone)]
pub struct NftTransaction {
	transaction: Transaction,
	address: Option<String>,
	sender: Option<String>,
	receiver: Option<String>,
	nft_id: Option<String>,
}

impl NftTransaction {
	pub fn transaction(&self) -> &Transaction {
		&self.transaction
	}

	pub fn address(&self) -> Option<&str> {
		self.address.as_deref()
	}

	pub fn sender(&self) -> Option<&str> {
		self.sender.as_deref()
	}

	pub fn receiver(&self) -> Option<&str> {
		self.receiver.as_deref()
	}

	pub fn nft_id(&self) -> Option<&str> {
		self.nft_id.as_deref()
	}
}

/// Transaction delivered to a listener callback, typed by the listener's category
#[derive(Debug, Clone)]
pub enum ListenerTransaction {
	General(Transaction),
	Contract(ContractTransaction),
	Coin(CoinTransaction),
	Token(TokenTransaction),
	Nft(NftTransaction),
}

impl ListenerTransaction {
	/// Wraps a matched record into the variant of `category`
	pub fn from_record(
		category: Category,
		record: DecodedRecord,
		fetcher: TransactionDataFetcher,
	) -> Self {
		let transaction = Transaction::new(fetcher);
		match category {
			Category::General => Self::General(transaction),
			Category::Contract => Self::Contract(ContractTransaction {
				transaction,
				address: record.address,
			}),
			Category::Coin => Self::Coin(CoinTransaction {
				transaction,
				sender: record.sender,
				receiver: record.receiver,
				amount: record.amount,
			}),
			Category::Token => Self::Token(TokenTransaction {
				transaction,
				address: record.address,
				sender: record.sender,
				receiver: record.receiver,
				amount: record.amount,
			}),
			Category::Nft => Self::Nft(NftTransaction {
				transaction,
				address: record.address,
				sender: record.sender,
				receiver: record.receiver,
				nft_id: record.nft_id,
			}),
		}
	}

	pub fn category(&self) -> Category {
		match self {
			Self::General(_) => Category::General,
			Self::Contract(_) => Category::Contract,
			Self::Coin(_) => Category::Coin,
			Self::Token(_) => Category::Token,
			Self::Nft(_) => Category::Nft,
		}
	}

	pub fn transaction(&self) -> &Transaction {
		match self {
			Self::General(tx) => tx,
			Self::Contract(tx) => &tx.transaction,
			Self::Coin(tx) => &tx.transaction,
			Self::Token(tx) => &tx.transaction,
			Self::Nft(tx) => &tx.transaction,
		}
	}

	pub fn id(&self) -> &str {
		self.transaction().id()
	}
}
