//! Listener filters.
//!
//! A filter is tagged by its category and only carries the fields that make sense for
//! it. Empty strings are treated the same as absent fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, fmt};

use crate::utils::address::{are_same_address, normalize_address};

/// Kind of activity a listener watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	/// Any transaction, optionally restricted to a signer
	General,
	/// Interactions with a contract
	Contract,
	/// Native coin transfers
	Coin,
	/// Fungible token transfers
	Token,
	/// Non-fungible token transfers
	Nft,
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::General => "general",
			Self::Contract => "contract",
			Self::Coin => "coin",
			Self::Token => "token",
			Self::Nft => "nft",
		};
		write!(f, "{}", name)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CoinFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver: Option<String>,
	/// Token contract, or the issuer account on ledger chains
	pub address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NftFilter {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiver: Option<String>,
	pub address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nft_id: Option<String>,
}

/// Caller supplied filter of a listener, tagged by category
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ListenerFilter {
	General(GeneralFilter),
	Contract(ContractFilter),
	Coin(CoinFilter),
	Token(TokenFilter),
	Nft(NftFilter),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value
		.as_deref()
		.map(str::trim)
		.filter(|value| !value.is_empty())
}

impl ListenerFilter {
	pub fn category(&self) -> Category {
		match self {
			Self::General(_) => Category::General,
			Self::Contract(_) => Category::Contract,
			Self::Coin(_) => Category::Coin,
			Self::Token(_) => Category::Token,
			Self::Nft(_) => Category::Nft,
		}
	}

	pub fn signer(&self) -> Option<&str> {
		match self {
			Self::General(f) => non_empty(&f.signer),
			Self::Contract(f) => non_empty(&f.signer),
			Self::Coin(f) => non_empty(&f.signer),
			Self::Token(f) => non_empty(&f.signer),
			Self::Nft(f) => non_empty(&f.signer),
		}
	}

	pub fn sender(&self) -> Option<&str> {
		match self {
			Self::General(_) | Self::Contract(_) => None,
			Self::Coin(f) => non_empty(&f.sender),
			Self::Token(f) => non_empty(&f.sender),
			Self::Nft(f) => non_empty(&f.sender),
		}
	}

	pub fn receiver(&self) -> Option<&str> {
		match self {
			Self::General(_) | Self::Contract(_) => None,
			Self::Coin(f) => non_empty(&f.receiver),
			Self::Token(f) => non_empty(&f.receiver),
			Self::Nft(f) => non_empty(&f.receiver),
		}
	}

	/// Contract (or token issuer) address the filter is bound to
	pub fn address(&self) -> Option<&str> {
		match self {
			Self::General(_) | Self::Coin(_) => None,
			Self::Contract(f) => non_empty(&f.address),
			Self::Token(f) => Some(f.address.trim()).filter(|a| !a.is_empty()),
			Self::Nft(f) => Some(f.address.trim()).filter(|a| !a.is_empty()),
		}
	}

	pub fn amount(&self) -> Option<Decimal> {
		match self {
			Self::Coin(f) => f.amount,
			Self::Token(f) => f.amount,
			_ => None,
		}
	}

	pub fn nft_id(&self) -> Option<&str> {
		match self {
			Self::Nft(f) => non_empty(&f.nft_id),
			_ => None,
		}
	}

	/// Account whose activity a poll based source has to query
	pub fn watched_address(&self) -> Option<&str> {
		self.receiver().or(self.sender()).or(self.signer())
	}

	/// Checks the filter for contradictions
	///
	/// # Returns
	/// * `Result<(), String>` - Ok, or a description of the contradiction
	pub fn validate(&self) -> Result<(), String> {
		if let (Some(sender), Some(signer)) = (self.sender(), self.signer()) {
			if !are_same_address(sender, signer) {
				return Err(format!(
					"{} filter has sender {} but signer {}; they must be equal when both are set",
					self.category(),
					sender,
					signer
				));
			}
		}

		if matches!(self, Self::Token(_) | Self::Nft(_)) && self.address().is_none() {
			return Err(format!(
				"{} filter requires a contract address",
				self.category()
			));
		}

		if let Some(amount) = self.amount() {
			if amount.is_sign_negative() {
				return Err(format!("amount must not be negative, got {}", amount));
			}
		}

		Ok(())
	}

	/// Deterministic id of the subscription this filter produces
	///
	/// Derived from the category and the filter's fields, with addresses normalized so
	/// that filters differing only in letter case share an id.
	pub fn subscription_id(&self) -> String {
		let mut fields: BTreeMap<&'static str, String> = BTreeMap::new();
		if let Some(signer) = self.signer() {
			fields.insert("signer", normalize_address(signer));
		}
		if let Some(sender) = self.sender() {
			fields.insert("sender", normalize_address(sender));
		}
		if let Some(receiver) = self.receiver() {
			fields.insert("receiver", normalize_address(receiver));
		}
		if let Some(address) = self.address() {
			fields.insert("address", normalize_address(address));
		}
		if let Some(amount) = self.amount() {
			fields.insert("amount", amount.normalize().to_string());
		}
		if let Some(nft_id) = self.nft_id() {
			fields.insert("nft_id", nft_id.to_string());
		}

		let canonical = serde_json::to_string(&fields).unwrap_or_default();
		let digest = Sha256::digest(format!("{}:{}", self.category(), canonical).as_bytes());
		hex::encode(&digest[..16])
	}
}
