//! EVM records: block transactions and ERC-20/ERC-721 `Transfer` logs.

use serde_json::Value;

use super::{
	helpers::{address_to_topic, nft_id_to_topic, owned_str, str_field, topic_to_address},
	SubscriptionRequest,
};
use crate::{
	models::{Category, DecodedRecord, ListenerFilter, NetworkKind},
	services::listener::FeedError,
	utils::{
		address::are_same_address,
		constants::TRANSFER_EVENT_TOPIC,
		units::{from_hex_base_units, parse_u256},
	},
};

pub(super) fn plan(filter: &ListenerFilter) -> SubscriptionRequest {
	match filter.category() {
		Category::General | Category::Coin => SubscriptionRequest::EvmHeads,
		Category::Contract => SubscriptionRequest::EvmLogs {
			address: filter.address().map(str::to_string),
			topics: Vec::new(),
		},
		Category::Token | Category::Nft => {
			let mut topics = vec![
				Some(TRANSFER_EVENT_TOPIC.to_string()),
				filter.sender().map(address_to_topic),
				filter.receiver().map(address_to_topic),
				filter.nft_id().and_then(nft_id_to_topic),
			];
			while matches!(topics.last(), Some(None)) {
				topics.pop();
			}
			SubscriptionRequest::EvmLogs {
				address: filter.address().map(str::to_string),
				topics,
			}
		}
	}
}

fn is_log(payload: &Value) -> bool {
	payload.get("topics").is_some() && payload.get("transactionHash").is_some()
}

pub(super) fn extract(
	category: Category,
	token_decimals: Option<u32>,
	payload: &Value,
) -> Result<Option<DecodedRecord>, FeedError> {
	match category {
		Category::General | Category::Coin => {
			if is_log(payload) {
				return Ok(None);
			}
			decode_transaction(category, payload)
		}
		Category::Contract | Category::Token | Category::Nft => {
			if !is_log(payload) {
				return Ok(None);
			}
			if payload.get("removed").and_then(Value::as_bool) == Some(true) {
				tracing::debug!(
					tx = str_field(payload, "transactionHash").unwrap_or_default(),
					"Dropping log removed by a reorg"
				);
				return Ok(None);
			}
			decode_log(category, token_decimals, payload)
		}
	}
}

fn decode_transaction(
	category: Category,
	tx: &Value,
) -> Result<Option<DecodedRecord>, FeedError> {
	let id = str_field(tx, "hash")
		.ok_or_else(|| FeedError::Decode("EVM transaction without hash".to_string()))?;

	let amount = str_field(tx, "value")
		.and_then(|value| from_hex_base_units(value, NetworkKind::Evm.native_decimals()));

	if category == Category::Coin {
		let plain_transfer = matches!(str_field(tx, "input"), None | Some("0x"));
		let has_value = amount.is_some_and(|amount| !amount.is_zero());
		if !plain_transfer || !has_value {
			return Ok(None);
		}
	}

	let from = owned_str(tx, "from");
	Ok(Some(DecodedRecord {
		signer: from.clone(),
		sender: from,
		receiver: owned_str(tx, "to"),
		amount,
		..DecodedRecord::new(id)
	}))
}

fn decode_log(
	category: Category,
	token_decimals: Option<u32>,
	log: &Value,
) -> Result<Option<DecodedRecord>, FeedError> {
	let id = str_field(log, "transactionHash")
		.ok_or_else(|| FeedError::Decode("EVM log without transactionHash".to_string()))?;
	let topics: Vec<&str> = log
		.get("topics")
		.and_then(Value::as_array)
		.map(|topics| topics.iter().filter_map(Value::as_str).collect())
		.unwrap_or_default();

	let mut record = DecodedRecord {
		address: owned_str(log, "address"),
		..DecodedRecord::new(id)
	};

	let expected_topics = match category {
		Category::Token => 3,
		Category::Nft => 4,
		_ => return Ok(Some(record)),
	};
	let is_transfer = topics
		.first()
		.is_some_and(|topic| are_same_address(topic, TRANSFER_EVENT_TOPIC));
	if !is_transfer || topics.len() != expected_topics {
		return Ok(None);
	}

	record.sender = topic_to_address(topics[1]);
	record.receiver = topic_to_address(topics[2]);
	if category == Category::Token {
		record.amount = token_decimals
			.and_then(|decimals| from_hex_base_units(str_field(log, "data").unwrap_or("0x"), decimals));
	} else {
		record.nft_id = parse_u256(topics[3]).map(|id| id.to_string());
	}

	Ok(Some(record))
}

pub(super) fn complete(category: Category, record: &mut DecodedRecord, data: &Value) {
	match category {
		Category::General | Category::Coin => {
			if let Ok(Some(fetched)) = decode_transaction(Category::General, data) {
				record.fill_missing(fetched);
			}
		}
		// Logs never carry the signer
		Category::Contract | Category::Token | Category::Nft => {
			if record.signer.is_none() {
				record.signer = owned_str(data, "from");
			}
		}
	}
}
