//! Ledger listeners against an in-process WebSocket node.

use chain_listener::{
	models::{Category, ListenerConfig, NetworkConfig, NetworkKind},
	services::{
		blockchain::WsConfig,
		listener::{FeedError, Listener},
		provider::Provider,
		transaction::ListenerTransaction,
	},
	utils::tests::FilterBuilder,
};
use serde_json::{json, Value};
use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use crate::integration::mocks::{wait_until, TestWsServer};

fn provider(server: &TestWsServer) -> Provider {
	Provider::with_ws_config(
		NetworkKind::Ledger,
		NetworkConfig::testnet()
			.with_ws_endpoint(server.url.clone())
			.with_rpc_endpoint("http://127.0.0.1:9"),
		WsConfig::single_attempt(),
	)
	.unwrap()
}

fn payment(hash: &str, account: &str, destination: &str) -> Value {
	json!({
		"type": "transaction",
		"validated": true,
		"engine_result": "tesSUCCESS",
		"transaction": {
			"hash": hash,
			"TransactionType": "Payment",
			"Account": account,
			"Destination": destination,
			"Amount": "1000000"
		},
		"meta": {"TransactionResult": "tesSUCCESS", "delivered_amount": "1000000"}
	})
}

type Seen = Arc<Mutex<Vec<String>>>;

async fn coin_listener(provider: &Provider, receiver: &str) -> (Listener, Seen) {
	let filter = FilterBuilder::new()
		.category(Category::Coin)
		.receiver(receiver)
		.build();
	let listener = Listener::with_config(provider, filter, ListenerConfig::default()).unwrap();
	let seen: Seen = Arc::new(Mutex::new(Vec::new()));
	let sink = seen.clone();
	listener
		.on(move |tx: &ListenerTransaction| sink.lock().unwrap().push(tx.id().to_string()))
		.await
		.unwrap();
	(listener, seen)
}

#[tokio::test]
async fn test_listeners_share_one_connection() {
	let server = TestWsServer::start().await;
	let provider = provider(&server);

	let (alice, alice_seen) = coin_listener(&provider, "rAlice").await;
	let (bob, bob_seen) = coin_listener(&provider, "rBob").await;

	assert_eq!(server.connection_count(), 1);
	assert_eq!(provider.ws_pool().lease_count(&server.url).await, 2);
	let subscribes = server.commands("subscribe");
	assert_eq!(subscribes.len(), 2);
	assert_eq!(subscribes[0]["accounts"], json!(["rAlice"]));
	assert_eq!(subscribes[1]["accounts"], json!(["rBob"]));

	server.push(payment("TX_A", "rSomeone", "rAlice"));
	server.push(payment("TX_B", "rSomeone", "rBob"));
	assert!(wait_until(|| alice_seen.lock().unwrap().len() == 1 && bob_seen.lock().unwrap().len() == 1).await);
	assert_eq!(*alice_seen.lock().unwrap(), vec!["TX_A"]);
	assert_eq!(*bob_seen.lock().unwrap(), vec!["TX_B"]);

	alice.stop().await;
	assert!(!alice.get_status());
	assert!(bob.get_status());

	let unsubscribes = server.commands("unsubscribe");
	assert_eq!(unsubscribes.len(), 1);
	assert_eq!(unsubscribes[0]["accounts"], json!(["rAlice"]));

	// The connection stays up for the remaining listener
	server.push(payment("TX_B2", "rSomeone", "rBob"));
	assert!(wait_until(|| bob_seen.lock().unwrap().len() == 2).await);
	assert_eq!(alice_seen.lock().unwrap().len(), 1);
	assert_eq!(server.connection_count(), 1);

	bob.stop().await;
	assert!(provider.ws_pool().is_empty().await);
}

#[tokio::test]
async fn test_shared_account_stays_subscribed() {
	let server = TestWsServer::start().await;
	let provider = provider(&server);

	let (first, _) = coin_listener(&provider, "rShared").await;
	let (second, second_seen) = coin_listener(&provider, "rShared").await;

	// Only the first listener needed a subscribe command
	assert_eq!(server.commands("subscribe").len(), 1);

	first.stop().await;
	assert!(server.commands("unsubscribe").is_empty());

	server.push(payment("TX1", "rSomeone", "rShared"));
	assert!(wait_until(|| second_seen.lock().unwrap().len() == 1).await);

	second.stop().await;
	assert!(wait_until(|| server.commands("unsubscribe").len() == 1).await);
	assert_eq!(server.commands("unsubscribe")[0]["accounts"], json!(["rShared"]));
}

#[tokio::test]
async fn test_events_limit_is_reported_without_stopping() {
	let server = TestWsServer::start().await;
	let provider = provider(&server);

	let (listener, seen) = {
		let filter = FilterBuilder::new().signer("rSigner").build();
		let listener = Listener::with_config(&provider, filter, ListenerConfig::default()).unwrap();
		let errors: Arc<Mutex<Vec<FeedError>>> = Arc::new(Mutex::new(Vec::new()));
		let error_sink = errors.clone();
		listener.on_error(move |e| error_sink.lock().unwrap().push(e.clone()));
		let seen: Seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		listener
			.on(move |tx| sink.lock().unwrap().push(tx.id().to_string()))
			.await
			.unwrap();

		server.push(json!({
			"type": "error",
			"error": "slowDown",
			"error_message": "Events limit reached"
		}));
		assert!(wait_until(|| !errors.lock().unwrap().is_empty()).await);
		assert!(matches!(errors.lock().unwrap()[0], FeedError::EventsLimitReached(_)));
		(listener, seen)
	};

	assert!(listener.get_status());
	server.push(payment("TX1", "rSigner", "rOther"));
	assert!(wait_until(|| seen.lock().unwrap().len() == 1).await);
}

#[tokio::test]
async fn test_new_listener_after_stop_reconnects() {
	let server = TestWsServer::start().await;
	let provider = provider(&server);

	let (first, first_seen) = coin_listener(&provider, "rAlice").await;
	server.push(payment("TX1", "rSomeone", "rAlice"));
	assert!(wait_until(|| first_seen.lock().unwrap().len() == 1).await);
	first.stop().await;
	assert!(provider.ws_pool().is_empty().await);

	let (second, second_seen) = coin_listener(&provider, "rAlice").await;
	assert_eq!(server.connection_count(), 2);

	server.push(payment("TX1", "rSomeone", "rAlice"));
	assert!(wait_until(|| second_seen.lock().unwrap().len() == 1).await);
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(first_seen.lock().unwrap().len(), 1);

	second.stop().await;
}

#[tokio::test]
async fn test_unreachable_node_fails_on() {
	// Nothing listens on the discard port
	let provider = Provider::with_ws_config(
		NetworkKind::Ledger,
		NetworkConfig::testnet().with_ws_endpoint("ws://127.0.0.1:9"),
		WsConfig::single_attempt(),
	)
	.unwrap();
	let listener = Listener::new(&provider, FilterBuilder::new().build()).unwrap();

	let result = listener.on(|_| {}).await;
	assert!(matches!(
		result,
		Err(chain_listener::services::listener::ListenerError::ConnectionUnavailable(_))
	));
	assert!(!listener.get_status());
}

#[tokio::test]
async fn test_refused_subscribe_does_not_strand_a_concurrent_listener() {
	let server = TestWsServer::start().await;
	server.reject_subscribes(1);
	server.delay_responses(Duration::from_millis(100));
	let provider = provider(&server);

	let filter = || {
		FilterBuilder::new()
			.category(Category::Coin)
			.receiver("rAlice")
			.build()
	};
	let first = Listener::new(&provider, filter()).unwrap();
	let second = Listener::new(&provider, filter()).unwrap();
	let seen: Seen = Arc::new(Mutex::new(Vec::new()));
	let (first_sink, second_sink) = (seen.clone(), seen.clone());

	let (first_result, second_result) = tokio::join!(
		first.on(move |tx: &ListenerTransaction| first_sink.lock().unwrap().push(tx.id().to_string())),
		second.on(move |tx: &ListenerTransaction| second_sink.lock().unwrap().push(tx.id().to_string())),
	);

	// Exactly one subscribe was refused; the other listener sent its own
	assert_eq!(
		[first_result.is_ok(), second_result.is_ok()].iter().filter(|ok| **ok).count(),
		1
	);
	let subscribes = server.commands("subscribe");
	assert_eq!(subscribes.len(), 2);
	assert!(subscribes.iter().all(|command| command["accounts"] == json!(["rAlice"])));
	assert_eq!(provider.ws_pool().lease_count(&server.url).await, 1);

	server.delay_responses(Duration::ZERO);
	server.push(payment("TX1", "rSomeone", "rAlice"));
	assert!(wait_until(|| seen.lock().unwrap().len() == 1).await);

	first.stop().await;
	second.stop().await;
}
