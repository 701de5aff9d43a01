//! Ledger records: `transaction` stream messages and `tx` lookups.

use serde_json::Value;

use super::{
	helpers::{owned_str, str_field},
	SubscriptionRequest,
};
use crate::{
	models::{Category, DecodedRecord, ListenerFilter, NetworkKind},
	services::listener::FeedError,
	utils::{
		address::are_same_address,
		units::{from_base_units, parse_display_amount},
	},
};

const TRANSACTIONS_STREAM: &str = "transactions";

pub(super) fn plan(filter: &ListenerFilter) -> SubscriptionRequest {
	let mut candidates = vec![filter.signer(), filter.sender(), filter.receiver()];
	if filter.category() == Category::Token && candidates.iter().all(Option::is_none) {
		candidates.push(filter.address());
	}

	let mut accounts: Vec<String> = Vec::new();
	for account in candidates.into_iter().flatten() {
		if !accounts.iter().any(|known| are_same_address(known, account)) {
			accounts.push(account.to_string());
		}
	}

	let streams = if accounts.is_empty() {
		vec![TRANSACTIONS_STREAM.to_string()]
	} else {
		Vec::new()
	};
	SubscriptionRequest::Ledger { streams, accounts }
}

pub(super) fn extract(
	category: Category,
	message: &Value,
) -> Result<Option<DecodedRecord>, FeedError> {
	if str_field(message, "type") != Some("transaction") {
		return Ok(None);
	}
	if message.get("validated").and_then(Value::as_bool) == Some(false) {
		return Ok(None);
	}

	let tx = message
		.get("transaction")
		.or_else(|| message.get("tx_json"))
		.ok_or_else(|| FeedError::Decode("ledger message without transaction".to_string()))?;
	let id = str_field(tx, "hash")
		.or_else(|| str_field(message, "hash"))
		.ok_or_else(|| FeedError::Decode("ledger transaction without hash".to_string()))?;

	Ok(decode_fields(category, id, tx, message.get("meta")))
}

fn decode_fields(
	category: Category,
	id: &str,
	tx: &Value,
	meta: Option<&Value>,
) -> Option<DecodedRecord> {
	let account = owned_str(tx, "Account");
	let mut record = DecodedRecord {
		signer: account.clone(),
		sender: account,
		receiver: owned_str(tx, "Destination"),
		..DecodedRecord::new(id)
	};

	if category == Category::General {
		return Some(record);
	}

	if str_field(tx, "TransactionType") != Some("Payment") {
		return None;
	}
	// API v2 renames Amount to DeliverMax
	let amount = tx.get("Amount").or_else(|| tx.get("DeliverMax"))?;
	let delivered = meta.and_then(|meta| meta.get("delivered_amount"));

	match category {
		Category::Coin => {
			let drops = amount.as_str()?;
			let drops = delivered.and_then(Value::as_str).unwrap_or(drops);
			record.amount = from_base_units(drops, NetworkKind::Ledger.native_decimals());
		}
		Category::Token => {
			if !amount.is_object() {
				return None;
			}
			let issued = delivered.filter(|value| value.is_object()).unwrap_or(amount);
			record.address = owned_str(issued, "issuer");
			record.amount = str_field(issued, "value").and_then(parse_display_amount);
		}
		_ => return None,
	}

	Some(record)
}

pub(super) fn complete(category: Category, record: &mut DecodedRecord, data: &Value) {
	let tx = data.get("tx_json").unwrap_or(data);
	let Some(id) = str_field(data, "hash").or_else(|| str_field(tx, "hash")) else {
		return;
	};
	if let Some(fetched) = decode_fields(category, id, tx, data.get("meta")) {
		record.fill_missing(fetched);
	}
}
