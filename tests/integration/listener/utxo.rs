//! UTXO listeners polling a mocked Esplora API.

use chain_listener::{
	models::{Category, ListenerConfig, NetworkConfig, NetworkKind, TransactionStatus},
	services::{listener::Listener, provider::Provider, transaction::ListenerTransaction},
	utils::tests::FilterBuilder,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::{
	str::FromStr,
	sync::{Arc, Mutex},
	time::Duration,
};

use crate::integration::mocks::wait_until;

const WATCHED: &str = "bc1qwatched";

#[tokio::test]
async fn test_new_payment_to_watched_address_is_delivered() {
	let mut server = mockito::Server::new_async().await;
	let baseline = server
		.mock("GET", "/address/bc1qwatched/txs")
		.with_status(200)
		.with_body(json!([{"txid": "old", "vin": [], "vout": []}]).to_string())
		.create_async()
		.await;
	let _tip = server
		.mock("GET", "/blocks/tip/height")
		.with_status(200)
		.with_body("2500000")
		.create_async()
		.await;

	let provider = Provider::new(
		NetworkKind::Utxo,
		NetworkConfig::testnet().with_rpc_endpoint(server.url()),
	)
	.unwrap();
	let filter = FilterBuilder::new()
		.category(Category::Coin)
		.receiver(WATCHED)
		.amount(Decimal::from_str("0.0005").unwrap())
		.build();
	let listener = Listener::with_config(
		&provider,
		filter,
		ListenerConfig::default().with_poll_interval(Duration::from_millis(100)),
	)
	.unwrap();

	let delivered: Arc<Mutex<Vec<ListenerTransaction>>> = Arc::new(Mutex::new(Vec::new()));
	let sink = delivered.clone();
	assert!(listener
		.on(move |tx| sink.lock().unwrap().push(tx.clone()))
		.await
		.unwrap());

	for _ in 0..100 {
		if baseline.matched_async().await {
			break;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	baseline.remove_async().await;

	let payment = |txid: &str, sats: u64| {
		json!({
			"txid": txid,
			"vin": [{"prevout": {"scriptpubkey_address": "bc1qsender", "value": sats + 1000}}],
			"vout": [
				{"scriptpubkey_address": WATCHED, "value": sats},
				{"scriptpubkey_address": "bc1qsender", "value": 500}
			],
			"status": {"confirmed": false}
		})
	};
	server
		.mock("GET", "/address/bc1qwatched/txs")
		.with_status(200)
		.with_body(
			json!([payment("other_amount", 60_000), payment("new", 50_000), {"txid": "old"}]).to_string(),
		)
		.create_async()
		.await;
	let status = server
		.mock("GET", "/tx/new/status")
		.with_status(200)
		.with_body(json!({"confirmed": true, "block_height": 100}).to_string())
		.create_async()
		.await;

	assert!(wait_until(|| !delivered.lock().unwrap().is_empty()).await);
	listener.stop().await;

	let transaction = delivered.lock().unwrap()[0].clone();
	let ListenerTransaction::Coin(coin) = &transaction else {
		panic!("expected a coin transaction");
	};
	assert_eq!(coin.transaction().id(), "new");
	assert_eq!(coin.sender(), Some("bc1qsender"));
	assert_eq!(coin.receiver(), Some(WATCHED));
	assert_eq!(coin.amount(), Some(Decimal::from_str("0.0005").unwrap()));
	assert_eq!(delivered.lock().unwrap().len(), 1);

	assert_eq!(
		coin.transaction().get_status().await.unwrap(),
		TransactionStatus::Confirmed
	);
	status.assert_async().await;
}

#[tokio::test]
async fn test_watching_requires_an_address() {
	let provider = Provider::new(NetworkKind::Utxo, NetworkConfig::testnet()).unwrap();
	let listener = Listener::new(
		&provider,
		FilterBuilder::new().category(Category::Coin).build(),
	)
	.unwrap();

	let result = listener.on(|_| {}).await;
	assert!(matches!(
		result,
		Err(chain_listener::services::listener::ListenerError::ConfigurationError(_))
	));
}

#[tokio::test]
async fn test_unreachable_esplora_fails_on() {
	// Nothing listens on the discard port
	let provider = Provider::new(
		NetworkKind::Utxo,
		NetworkConfig::testnet().with_rpc_endpoint("http://127.0.0.1:9"),
	)
	.unwrap();
	let filter = FilterBuilder::new()
		.category(Category::Coin)
		.receiver(WATCHED)
		.build();
	let listener = Listener::new(&provider, filter).unwrap();

	let result = listener.on(|_| {}).await;
	assert!(matches!(
		result,
		Err(chain_listener::services::listener::ListenerError::ConnectionUnavailable(_))
	));
	assert!(!listener.get_status());
}
