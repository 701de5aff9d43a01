use crate::properties::strategies::{
	address_with_variant_strategy, display_amount_strategy, evm_address_strategy,
};
use chain_listener::{
	models::{Category, DecodedRecord, NetworkKind},
	services::matcher::{address_to_topic, topic_to_address, MatchOutcome, Matcher},
	utils::tests::FilterBuilder,
};
use proptest::{prelude::*, test_runner::Config};
use rust_decimal::Decimal;

fn coin_record(sender: &str, receiver: &str, amount: Decimal) -> DecodedRecord {
	DecodedRecord {
		signer: Some(sender.to_string()),
		sender: Some(sender.to_string()),
		receiver: Some(receiver.to_string()),
		amount: Some(amount),
		..DecodedRecord::new("tx")
	}
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_address_case_never_changes_the_outcome(
		(address, variant) in address_with_variant_strategy(),
		amount in display_amount_strategy(),
	) {
		let filter = FilterBuilder::new()
			.category(Category::Coin)
			.receiver(&variant)
			.amount(amount)
			.build();
		let matcher = Matcher::new(NetworkKind::Ledger, filter);

		prop_assert_eq!(
			matcher.evaluate(&coin_record("rSender", &address, amount)),
			MatchOutcome::Matched
		);
	}

	#[test]
	fn test_any_amount_difference_rejects(
		amount in display_amount_strategy(),
		delta in 1i64..1_000,
	) {
		let filter = FilterBuilder::new()
			.category(Category::Coin)
			.amount(amount)
			.build();
		let matcher = Matcher::new(NetworkKind::Utxo, filter);
		let other = amount + Decimal::new(delta, 8);

		prop_assert_eq!(
			matcher.evaluate(&coin_record("a", "b", other)),
			MatchOutcome::Rejected
		);
		// Trailing zeros do not matter
		let mut padded = amount;
		padded.rescale(amount.scale() + 2);
		prop_assert_eq!(
			matcher.evaluate(&coin_record("a", "b", padded)),
			MatchOutcome::Matched
		);
	}

	#[test]
	fn test_missing_field_needs_fetch_unless_another_rejects(
		signer in evm_address_strategy(),
		other in evm_address_strategy(),
	) {
		prop_assume!(signer != other);
		let filter = FilterBuilder::new()
			.category(Category::Contract)
			.signer(&signer)
			.address(&other)
			.build();
		let matcher = Matcher::new(NetworkKind::Evm, filter);

		let missing_signer = DecodedRecord {
			address: Some(other.clone()),
			..DecodedRecord::new("tx")
		};
		prop_assert_eq!(matcher.evaluate(&missing_signer), MatchOutcome::NeedsFetch);

		let wrong_contract = DecodedRecord {
			address: Some(signer.clone()),
			..DecodedRecord::new("tx")
		};
		prop_assert_eq!(matcher.evaluate(&wrong_contract), MatchOutcome::Rejected);
	}

	#[test]
	fn test_topic_encoding_keeps_the_address(address in evm_address_strategy()) {
		let topic = address_to_topic(&address.to_uppercase().replacen("0X", "0x", 1));
		prop_assert_eq!(topic.len(), 66);
		prop_assert_eq!(topic_to_address(&topic), Some(address));
	}
}
