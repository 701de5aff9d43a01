//! Field comparison and EVM word helpers shared by the extractors.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::utils::{address::are_same_address, units::parse_u256};

/// String member of a JSON object, ignoring empty strings
pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
	value
		.get(key)
		.and_then(Value::as_str)
		.filter(|s| !s.is_empty())
}

pub fn owned_str(value: &Value, key: &str) -> Option<String> {
	str_field(value, key).map(str::to_string)
}

/// Address held in the last 20 bytes of a 32-byte log topic
pub fn topic_to_address(topic: &str) -> Option<String> {
	let body = topic.strip_prefix("0x").unwrap_or(topic);
	if body.len() != 64 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
		return None;
	}
	Some(format!("0x{}", body[24..].to_lowercase()))
}

/// Left pads an address to a 32-byte log topic
pub fn address_to_topic(address: &str) -> String {
	let normalized = crate::utils::address::normalize_address(address);
	format!("0x{:0>64}", normalized)
}

/// 32-byte topic encoding of a token id given in decimal or `0x` hex
pub fn nft_id_to_topic(nft_id: &str) -> Option<String> {
	normalize_nft_id(nft_id)
		.and_then(|id| U256::from_str_radix(&id, 10).ok())
		.map(|id| format!("0x{:064x}", id))
}

/// Decimal rendering of a token id; accepts decimal or `0x` hex input
pub fn normalize_nft_id(nft_id: &str) -> Option<String> {
	let nft_id = nft_id.trim();
	if nft_id.starts_with("0x") || nft_id.starts_with("0X") {
		return parse_u256(nft_id).map(|id| id.to_string());
	}
	U256::from_str_radix(nft_id, 10).ok().map(|id| id.to_string())
}

/// Result of comparing one filter field against one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
	/// The filter does not constrain this field, or the values agree
	Pass,
	Mismatch,
	/// The filter constrains the field but the record does not carry it
	Missing,
}

pub fn check_address(expected: Option<&str>, actual: Option<&str>) -> FieldCheck {
	match (expected, actual) {
		(None, _) => FieldCheck::Pass,
		(Some(_), None) => FieldCheck::Missing,
		(Some(expected), Some(actual)) if are_same_address(expected, actual) => FieldCheck::Pass,
		_ => FieldCheck::Mismatch,
	}
}

pub fn check_amount(expected: Option<Decimal>, actual: Option<Decimal>) -> FieldCheck {
	match (expected, actual) {
		(None, _) => FieldCheck::Pass,
		(Some(_), None) => FieldCheck::Missing,
		(Some(expected), Some(actual)) if expected == actual => FieldCheck::Pass,
		_ => FieldCheck::Mismatch,
	}
}

pub fn check_nft_id(expected: Option<&str>, actual: Option<&str>) -> FieldCheck {
	match (expected, actual) {
		(None, _) => FieldCheck::Pass,
		(Some(_), None) => FieldCheck::Missing,
		(Some(expected), Some(actual)) => {
			let expected = normalize_nft_id(expected).unwrap_or_else(|| expected.trim().to_string());
			let actual = normalize_nft_id(actual).unwrap_or_else(|| actual.trim().to_string());
			if expected == actual {
				FieldCheck::Pass
			} else {
				FieldCheck::Mismatch
			}
		}
	}
}
