//! Matching of feed records against a listener filter.
//!
//! A [`Matcher`] is bound to one network and one filter. It knows which subscription
//! the filter needs ([`Matcher::plan`]), how to pull the comparable fields out of a raw
//! record ([`Matcher::extract`]) and how to compare them ([`Matcher::evaluate`]). When
//! a record lacks a field the filter constrains, the listener fetches the full
//! transaction and hands it to [`Matcher::complete`] before evaluating again.

mod evm;
mod helpers;
mod ledger;
mod utxo;

pub use helpers::{address_to_topic, normalize_nft_id, topic_to_address};

use serde_json::Value;

use crate::{
	models::{Category, DecodedRecord, ListenerFilter, NetworkKind, RawFeedRecord},
	services::listener::{FeedError, ListenerError},
};
use helpers::{check_address, check_amount, check_nft_id, FieldCheck};

/// Result of comparing a decoded record with the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
	Matched,
	Rejected,
	/// No present field rejects, but a constrained field is missing
	NeedsFetch,
}

/// Network specific description of what to subscribe to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionRequest {
	/// `subscribe` command of ledger nodes; `streams` is used when `accounts` is empty
	Ledger {
		streams: Vec<String>,
		accounts: Vec<String>,
	},
	/// `eth_subscribe ["newHeads"]`, expanded into the block's transactions
	EvmHeads,
	/// `eth_subscribe ["logs", {address, topics}]`
	EvmLogs {
		address: Option<String>,
		topics: Vec<Option<String>>,
	},
	/// Periodic read of `GET /address/{address}/txs`
	UtxoAddress { address: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPlan {
	/// Deterministic id derived from the filter, used as the command id
	pub id: String,
	pub category: Category,
	pub request: SubscriptionRequest,
}

#[derive(Debug, Clone)]
pub struct Matcher {
	network: NetworkKind,
	filter: ListenerFilter,
	token_decimals: Option<u32>,
}

impl Matcher {
	pub fn new(network: NetworkKind, filter: ListenerFilter) -> Self {
		Self {
			network,
			filter,
			token_decimals: None,
		}
	}

	/// Sets the decimals of the watched token contract
	pub fn with_token_decimals(mut self, decimals: u32) -> Self {
		self.token_decimals = Some(decimals);
		self
	}

	pub fn network(&self) -> NetworkKind {
		self.network
	}

	pub fn filter(&self) -> &ListenerFilter {
		&self.filter
	}

	pub fn category(&self) -> Category {
		self.filter.category()
	}

	/// Whether the token's decimals must be read before records can be decoded
	pub fn needs_token_decimals(&self) -> bool {
		self.network == NetworkKind::Evm
			&& self.category() == Category::Token
			&& self.token_decimals.is_none()
	}

	/// Builds the subscription the filter needs on this network
	///
	/// # Errors
	/// * `NotImplemented` - the category is not supported by the network
	/// * `ConfigurationError` - the filter lacks a field the network needs to subscribe
	pub fn plan(&self) -> Result<SubscriptionPlan, ListenerError> {
		let category = self.category();
		if !self.network.supports(category) {
			return Err(ListenerError::not_implemented(self.network, category));
		}

		let request = match self.network {
			NetworkKind::Evm => evm::plan(&self.filter),
			NetworkKind::Ledger => ledger::plan(&self.filter),
			NetworkKind::Utxo => utxo::plan(&self.filter)?,
		};

		Ok(SubscriptionPlan {
			id: self.filter.subscription_id(),
			category,
			request,
		})
	}

	/// Extracts the comparable fields of a raw record
	///
	/// # Returns
	/// * `Ok(Some(record))` - the record is relevant to the filter's category
	/// * `Ok(None)` - the record can never match this category and is skipped
	/// * `Err(FeedError::Decode)` - the record is malformed
	pub fn extract(&self, record: &RawFeedRecord) -> Result<Option<DecodedRecord>, FeedError> {
		if record.network != self.network {
			return Err(FeedError::Decode(format!(
				"{} record fed to a {} matcher",
				record.network, self.network
			)));
		}

		match self.network {
			NetworkKind::Evm => evm::extract(self.category(), self.token_decimals, &record.payload),
			NetworkKind::Ledger => ledger::extract(self.category(), &record.payload),
			NetworkKind::Utxo => utxo::extract(&self.filter, &record.payload),
		}
	}

	/// Compares a decoded record with the filter
	///
	/// Every constrained field present in the record is checked first; any mismatch
	/// rejects even if other fields are missing.
	pub fn evaluate(&self, record: &DecodedRecord) -> MatchOutcome {
		let filter = &self.filter;
		let checks = [
			check_address(filter.signer(), record.signer.as_deref()),
			check_address(filter.sender(), record.sender.as_deref()),
			check_address(filter.receiver(), record.receiver.as_deref()),
			check_address(filter.address(), record.address.as_deref()),
			check_amount(filter.amount(), record.amount),
			check_nft_id(filter.nft_id(), record.nft_id.as_deref()),
		];

		if checks.contains(&FieldCheck::Mismatch) {
			MatchOutcome::Rejected
		} else if checks.contains(&FieldCheck::Missing) {
			MatchOutcome::NeedsFetch
		} else {
			MatchOutcome::Matched
		}
	}

	/// Fills the missing fields of `record` from the fetched transaction document
	pub fn complete(&self, record: &mut DecodedRecord, data: &Value) {
		match self.network {
			NetworkKind::Evm => evm::complete(self.category(), record, data),
			NetworkKind::Ledger => ledger::complete(self.category(), record, data),
			NetworkKind::Utxo => utxo::complete(&self.filter, record, data),
		}
	}
}
