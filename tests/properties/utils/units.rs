use crate::properties::strategies::base_units_strategy;
use chain_listener::utils::units::{from_base_units, from_hex_base_units};
use proptest::{prelude::*, test_runner::Config};
use rust_decimal::Decimal;

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_scaling_is_exact((units, decimals) in base_units_strategy()) {
		let amount = from_base_units(&units.to_string(), decimals).unwrap();
		let factor = Decimal::from_i128_with_scale(10i128.pow(decimals), 0);
		prop_assert_eq!(amount * factor, Decimal::from(units));
	}

	#[test]
	fn test_hex_and_decimal_agree((units, decimals) in base_units_strategy()) {
		prop_assert_eq!(
			from_hex_base_units(&format!("0x{:x}", units), decimals),
			from_base_units(&units.to_string(), decimals)
		);
	}

	#[test]
	fn test_non_digits_are_rejected(text in "[0-9]*[a-z.\\-][0-9a-z]*", decimals in 0u32..=18) {
		prop_assert!(from_base_units(&text, decimals).is_none());
	}
}
