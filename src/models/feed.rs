//! Feed records flowing from event sources to matchers.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::NetworkKind;

/// Transport specific event payload, kept only for one match attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeedRecord {
	pub network: NetworkKind,
	pub payload: Value,
}

impl RawFeedRecord {
	pub fn new(network: NetworkKind, payload: Value) -> Self {
		Self { network, payload }
	}
}

/// Fields extracted from a raw record
///
/// A field is `None` when the record does not carry it. Matchers treat a missing field
/// that the filter needs as a reason to fetch the full transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
	pub id: String,
	pub signer: Option<String>,
	pub sender: Option<String>,
	pub receiver: Option<String>,
	pub address: Option<String>,
	pub amount: Option<Decimal>,
	pub nft_id: Option<String>,
}

impl DecodedRecord {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	/// Completes missing fields from another decoding of the same transaction
	pub fn fill_missing(&mut self, other: DecodedRecord) {
		self.signer = self.signer.take().or(other.signer);
		self.sender = self.sender.take().or(other.sender);
		self.receiver = self.receiver.take().or(other.receiver);
		self.address = self.address.take().or(other.address);
		self.amount = self.amount.take().or(other.amount);
		self.nft_id = self.nft_id.take().or(other.nft_id);
	}
}
