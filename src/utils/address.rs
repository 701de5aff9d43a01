//! Address comparison helpers
//!
//! Addresses coming from filters and from chain feeds are compared case-insensitively.
//! EVM style `0x` prefixes are ignored so that padded topic addresses and checksummed
//! addresses compare equal.

/// Normalizes an address by trimming whitespace, removing a `0x` prefix and
/// lower-casing the rest.
///
/// # Arguments
/// * `address` - The address string to normalize
///
/// # Returns
/// The normalized address string
pub fn normalize_address(address: &str) -> String {
	let trimmed = address.trim();
	trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.unwrap_or(trimmed)
		.to_lowercase()
}

/// Checks if two addresses are the same after normalization
pub fn are_same_address(address1: &str, address2: &str) -> bool {
	normalize_address(address1) == normalize_address(address2)
}
