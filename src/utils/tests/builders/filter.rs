//! Test helper utilities for listener filters
//!
//! - `FilterBuilder`: Builder for creating test `ListenerFilter` instances

use rust_decimal::Decimal;

use crate::models::{
	Category, CoinFilter, ContractFilter, GeneralFilter, ListenerFilter, NftFilter, TokenFilter,
};

/// Builder for creating test filters of any category
///
/// Fields that do not exist for the chosen category are ignored by [`Self::build`].
#[derive(Debug, Clone)]
pub struct FilterBuilder {
	category: Category,
	signer: Option<String>,
	sender: Option<String>,
	receiver: Option<String>,
	address: Option<String>,
	amount: Option<Decimal>,
	nft_id: Option<String>,
}

impl Default for FilterBuilder {
	fn default() -> Self {
		Self {
			category: Category::General,
			signer: None,
			sender: None,
			receiver: None,
			address: None,
			amount: None,
			nft_id: None,
		}
	}
}

impl FilterBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn category(mut self, category: Category) -> Self {
		self.category = category;
		self
	}

	pub fn signer(mut self, signer: &str) -> Self {
		self.signer = Some(signer.to_string());
		self
	}

	pub fn sender(mut self, sender: &str) -> Self {
		self.sender = Some(sender.to_string());
		self
	}

	pub fn receiver(mut self, receiver: &str) -> Self {
		self.receiver = Some(receiver.to_string());
		self
	}

	pub fn address(mut self, address: &str) -> Self {
		self.address = Some(address.to_string());
		self
	}

	pub fn amount(mut self, amount: Decimal) -> Self {
		self.amount = Some(amount);
		self
	}

	pub fn nft_id(mut self, nft_id: &str) -> Self {
		self.nft_id = Some(nft_id.to_string());
		self
	}

	pub fn build(self) -> ListenerFilter {
		match self.category {
			Category::General => ListenerFilter::General(GeneralFilter {
				signer: self.signer,
			}),
			Category::Contract => ListenerFilter::Contract(ContractFilter {
				signer: self.signer,
				address: self.address,
			}),
			Category::Coin => ListenerFilter::Coin(CoinFilter {
				signer: self.signer,
				sender: self.sender,
				receiver: self.receiver,
				amount: self.amount,
			}),
			Category::Token => ListenerFilter::Token(TokenFilter {
				signer: self.signer,
				sender: self.sender,
				receiver: self.receiver,
				address: self.address.unwrap_or_default(),
				amount: self.amount,
			}),
			Category::Nft => ListenerFilter::Nft(NftFilter {
				signer: self.signer,
				sender: self.sender,
				receiver: self.receiver,
				address: self.address.unwrap_or_default(),
				nft_id: self.nft_id,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_filter() {
		let filter = FilterBuilder::new().build();
		assert_eq!(filter.category(), Category::General);
		assert!(filter.signer().is_none());
	}

	#[test]
	fn test_coin_filter() {
		let filter = FilterBuilder::new()
			.category(Category::Coin)
			.sender("A")
			.receiver("B")
			.amount(Decimal::from(10))
			.nft_id("ignored")
			.build();

		assert_eq!(filter.sender(), Some("A"));
		assert_eq!(filter.receiver(), Some("B"));
		assert_eq!(filter.amount(), Some(Decimal::from(10)));
		assert!(filter.nft_id().is_none());
	}
}
