//! UTXO records: Esplora transaction documents.

use serde_json::Value;

use super::{helpers::str_field, SubscriptionRequest};
use crate::{
	models::{DecodedRecord, ListenerFilter, NetworkKind},
	services::listener::{FeedError, ListenerError},
	utils::{address::are_same_address, units::from_base_units},
};

pub(super) fn plan(filter: &ListenerFilter) -> Result<SubscriptionRequest, ListenerError> {
	let address = filter.watched_address().ok_or_else(|| {
		ListenerError::configuration_error(format!(
			"{} listeners on utxo networks need a signer, sender or receiver address to poll",
			filter.category()
		))
	})?;
	Ok(SubscriptionRequest::UtxoAddress {
		address: address.to_string(),
	})
}

fn output_address(output: &Value) -> Option<&str> {
	str_field(output, "scriptpubkey_address")
}

fn output_amount(output: &Value) -> Option<rust_decimal::Decimal> {
	let sats = output.get("value").and_then(Value::as_u64)?;
	from_base_units(&sats.to_string(), NetworkKind::Utxo.native_decimals())
}

fn decode(filter: &ListenerFilter, tx: &Value) -> Result<DecodedRecord, FeedError> {
	let id = str_field(tx, "txid")
		.ok_or_else(|| FeedError::Decode("utxo transaction without txid".to_string()))?;

	let sender = tx
		.get("vin")
		.and_then(Value::as_array)
		.and_then(|inputs| inputs.first())
		.and_then(|input| input.get("prevout"))
		.and_then(output_address)
		.map(str::to_string);

	let outputs = tx
		.get("vout")
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.unwrap_or_default();
	let pays = |output: &&Value, address: &str| {
		output_address(output).is_some_and(|paid| are_same_address(paid, address))
	};
	let chosen = filter
		.receiver()
		.and_then(|receiver| outputs.iter().find(|output| pays(output, receiver)))
		.or_else(|| {
			sender.as_deref().and_then(|sender| {
				outputs
					.iter()
					.find(|output| output_address(output).is_some() && !pays(output, sender))
			})
		})
		.or_else(|| outputs.first());

	Ok(DecodedRecord {
		signer: sender.clone(),
		sender,
		receiver: chosen.and_then(output_address).map(str::to_string),
		amount: chosen.and_then(output_amount),
		..DecodedRecord::new(id)
	})
}

pub(super) fn extract(
	filter: &ListenerFilter,
	tx: &Value,
) -> Result<Option<DecodedRecord>, FeedError> {
	decode(filter, tx).map(Some)
}

pub(super) fn complete(filter: &ListenerFilter, record: &mut DecodedRecord, data: &Value) {
	if let Ok(fetched) = decode(filter, data) {
		record.fill_missing(fetched);
	}
}
