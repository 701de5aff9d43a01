//! Conversion of integer base units into display amounts.
//!
//! All conversions scale the integer mantissa; no floating point is involved.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts a decimal string of base units (`"1500000"`) into display units
///
/// Returns `None` when the string is not an unsigned integer or does not fit
/// into a `Decimal` mantissa.
pub fn from_base_units(digits: &str, decimals: u32) -> Option<Decimal> {
	let digits = digits.trim();
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	let mut value = Decimal::from_str_exact(digits).ok()?;
	value.set_scale(decimals).ok()?;
	Some(value.normalize())
}

/// Converts an EVM quantity (`0x` prefixed hex, up to 256 bits) into display units
pub fn from_hex_base_units(hex: &str, decimals: u32) -> Option<Decimal> {
	let value = parse_u256(hex)?;
	from_base_units(&value.to_string(), decimals)
}

/// Parses a `0x` prefixed hex quantity or 32-byte word
pub fn parse_u256(hex: &str) -> Option<U256> {
	let hex = hex.trim();
	let body = hex
		.strip_prefix("0x")
		.or_else(|| hex.strip_prefix("0X"))
		.unwrap_or(hex);
	if body.is_empty() {
		return Some(U256::ZERO);
	}
	U256::from_str_radix(body, 16).ok()
}

/// Parses an amount already expressed in display units (`"12.5"`)
pub fn parse_display_amount(value: &str) -> Option<Decimal> {
	Decimal::from_str(value.trim())
		.or_else(|_| Decimal::from_scientific(value.trim()))
		.ok()
		.map(|d| d.normalize())
}
