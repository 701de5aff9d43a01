//! EVM listeners against an in-process WebSocket node and a mocked JSON-RPC endpoint.

use chain_listener::{
	models::{Category, ListenerConfig, NetworkConfig, NetworkKind},
	services::{
		blockchain::WsConfig,
		listener::Listener,
		provider::Provider,
		transaction::ListenerTransaction,
	},
	utils::tests::FilterBuilder,
};
use mockito::Matcher;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::integration::mocks::{wait_until, TestWsServer};

const ALICE: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
const BOB: &str = "0x8617e340b3d01fa5f11f306f4090fd50e238070d";

#[tokio::test]
async fn test_coin_transfer_from_new_head() {
	let ws = TestWsServer::start().await;
	let mut rpc = mockito::Server::new_async().await;
	let block = rpc
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "eth_getBlockByHash"})))
		.with_status(200)
		.with_body(
			json!({
				"jsonrpc": "2.0",
				"id": 1,
				"result": {
					"hash": "0xblock",
					"transactions": [
						// Contract call carrying value
						{"hash": "0x01", "from": ALICE, "to": BOB, "value": "0xde0b6b3a7640000", "input": "0xa9059cbb"},
						// 1 ether plain transfer
						{"hash": "0x02", "from": ALICE, "to": BOB, "value": "0xde0b6b3a7640000", "input": "0x"},
						{"hash": "0x03", "from": BOB, "to": ALICE, "value": "0xde0b6b3a7640000", "input": "0x"}
					]
				}
			})
			.to_string(),
		)
		.expect(1)
		.create_async()
		.await;

	let provider = Provider::with_ws_config(
		NetworkKind::Evm,
		NetworkConfig::testnet()
			.with_ws_endpoint(ws.url.clone())
			.with_rpc_endpoint(rpc.url()),
		WsConfig::single_attempt(),
	)
	.unwrap();
	let filter = FilterBuilder::new()
		.category(Category::Coin)
		.sender(&ALICE.to_uppercase().replacen("0X", "0x", 1))
		.amount(Decimal::ONE)
		.build();
	let listener = Listener::with_config(&provider, filter, ListenerConfig::default()).unwrap();

	let delivered: Arc<Mutex<Vec<ListenerTransaction>>> = Arc::new(Mutex::new(Vec::new()));
	let sink = delivered.clone();
	listener
		.on(move |tx| sink.lock().unwrap().push(tx.clone()))
		.await
		.unwrap();

	let subscribes = ws.commands("eth_subscribe");
	assert_eq!(subscribes.len(), 1);
	assert_eq!(subscribes[0]["params"], json!(["newHeads"]));

	// Notification of another subscription is ignored
	ws.push(json!({
		"jsonrpc": "2.0",
		"method": "eth_subscription",
		"params": {"subscription": "0xother", "result": {"hash": "0xignored"}}
	}));
	ws.push(json!({
		"jsonrpc": "2.0",
		"method": "eth_subscription",
		"params": {"subscription": "0xfeed", "result": {"hash": "0xblock", "number": "0x10"}}
	}));

	assert!(wait_until(|| !delivered.lock().unwrap().is_empty()).await);
	block.assert_async().await;

	listener.stop().await;
	let unsubscribes = ws.commands("eth_unsubscribe");
	assert_eq!(unsubscribes.len(), 1);
	assert_eq!(unsubscribes[0]["params"], json!(["0xfeed"]));

	let delivered = delivered.lock().unwrap();
	assert_eq!(delivered.len(), 1);
	let ListenerTransaction::Coin(coin) = &delivered[0] else {
		panic!("expected a coin transaction");
	};
	assert_eq!(coin.transaction().id(), "0x02");
	assert_eq!(coin.amount(), Some(Decimal::ONE));
	assert_eq!(coin.receiver(), Some(BOB));
}

#[tokio::test]
async fn test_token_filter_subscribes_to_transfer_logs() {
	let ws = TestWsServer::start().await;
	let mut rpc = mockito::Server::new_async().await;
	let decimals = rpc
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "eth_call"})))
		.with_status(200)
		.with_body(
			json!({
				"jsonrpc": "2.0",
				"id": 1,
				"result": "0x0000000000000000000000000000000000000000000000000000000000000006"
			})
			.to_string(),
		)
		.expect(1)
		.create_async()
		.await;

	let provider = Provider::with_ws_config(
		NetworkKind::Evm,
		NetworkConfig::testnet()
			.with_ws_endpoint(ws.url.clone())
			.with_rpc_endpoint(rpc.url()),
		WsConfig::single_attempt(),
	)
	.unwrap();
	let token = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
	let filter = FilterBuilder::new()
		.category(Category::Token)
		.address(token)
		.receiver(BOB)
		.build();
	let listener = Listener::with_config(&provider, filter, ListenerConfig::default()).unwrap();
	let amounts: Arc<Mutex<Vec<Decimal>>> = Arc::new(Mutex::new(Vec::new()));
	let sink = amounts.clone();
	listener
		.on(move |tx| {
			if let ListenerTransaction::Token(token) = tx {
				sink.lock().unwrap().extend(token.amount());
			}
		})
		.await
		.unwrap();
	decimals.assert_async().await;

	let params = &ws.commands("eth_subscribe")[0]["params"];
	assert_eq!(params[0], "logs");
	assert_eq!(params[1]["address"], token);
	assert_eq!(
		params[1]["topics"][2],
		"0x0000000000000000000000008617e340b3d01fa5f11f306f4090fd50e238070d"
	);

	ws.push(json!({
		"jsonrpc": "2.0",
		"method": "eth_subscription",
		"params": {"subscription": "0xfeed", "result": {
			"address": token,
			"topics": [
				chain_listener::utils::constants::TRANSFER_EVENT_TOPIC,
				"0x00000000000000000000000052908400098527886e0f7030069857d2e4169ee7",
				"0x0000000000000000000000008617e340b3d01fa5f11f306f4090fd50e238070d"
			],
			"data": "0x00000000000000000000000000000000000000000000000000000000002625a0",
			"transactionHash": "0xlog",
			"removed": false
		}}
	}));

	assert!(wait_until(|| !amounts.lock().unwrap().is_empty()).await);
	assert_eq!(amounts.lock().unwrap()[0], Decimal::from_str_exact("2.5").unwrap());
	listener.stop().await;
}

#[tokio::test]
async fn test_failed_token_listener_returns_its_lease() {
	let ws = TestWsServer::start().await;
	let mut rpc = mockito::Server::new_async().await;
	let _reverted = rpc
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "eth_call"})))
		.with_status(200)
		.with_body(
			json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 3, "message": "execution reverted"}})
				.to_string(),
		)
		.create_async()
		.await;

	let provider = Provider::with_ws_config(
		NetworkKind::Evm,
		NetworkConfig::testnet()
			.with_ws_endpoint(ws.url.clone())
			.with_rpc_endpoint(rpc.url()),
		WsConfig::single_attempt(),
	)
	.unwrap();
	let filter = FilterBuilder::new()
		.category(Category::Token)
		.address("0x1c7d4b196cb0c7b01d743fbc6116a902379c7238")
		.build();

	let listener = Listener::new(&provider, filter).unwrap();
	let result = listener.on(|_| {}).await;
	assert!(matches!(
		result,
		Err(chain_listener::services::listener::ListenerError::SubscriptionError(_))
	));
	assert_eq!(provider.ws_pool().lease_count(&ws.url).await, 0);

	drop(listener);
	assert!(provider.ws_pool().is_empty().await);
	assert!(ws.commands("eth_subscribe").is_empty());
}
