use proptest::prelude::*;
use rust_decimal::Decimal;

const MAX_IDS: usize = 50;

/// Lower-case `0x` prefixed EVM address
pub fn evm_address_strategy() -> impl Strategy<Value = String> {
	"[0-9a-f]{40}".prop_map(|hex| format!("0x{}", hex))
}

/// Classic ledger account (`r` followed by base58 characters)
pub fn ledger_account_strategy() -> impl Strategy<Value = String> {
	"r[1-9A-HJ-NP-Za-km-z]{24,33}".prop_map(|s| s.to_string())
}

/// `address` with the letter case of each character chosen at random
pub fn case_variant_strategy(address: String) -> impl Strategy<Value = String> {
	let len = address.len();
	prop::collection::vec(any::<bool>(), len).prop_map(move |upper| {
		address
			.chars()
			.zip(upper)
			.map(|(c, upper)| {
				if upper {
					c.to_ascii_uppercase()
				} else {
					c.to_ascii_lowercase()
				}
			})
			.collect()
	})
}

/// Address paired with a case variant of itself
pub fn address_with_variant_strategy() -> impl Strategy<Value = (String, String)> {
	prop_oneof![evm_address_strategy(), ledger_account_strategy()].prop_flat_map(|address| {
		(Just(address.clone()), case_variant_strategy(address))
	})
}

/// Integer amount in base units with the decimals of a network or token
pub fn base_units_strategy() -> impl Strategy<Value = (u64, u32)> {
	(any::<u64>(), 0u32..=18)
}

/// Positive display amount with up to 8 fractional digits
pub fn display_amount_strategy() -> impl Strategy<Value = Decimal> {
	(1i64..=2_100_000_000_000_000, 0u32..=8).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Sequence of transaction ids with repetitions
pub fn id_sequence_strategy() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec("[A-F0-9]{4}".prop_map(|s| s.to_string()), 0..MAX_IDS)
}
