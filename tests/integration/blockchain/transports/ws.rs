use chain_listener::services::blockchain::{TransportError, WsConfig, WsConnection, WsConnectionPool};
use serde_json::json;
use std::{sync::Arc, time::Duration};

use crate::integration::mocks::TestWsServer;

#[tokio::test]
async fn test_command_gets_its_own_response() {
	let server = TestWsServer::start().await;
	let connection = WsConnection::connect(&server.url, None, &WsConfig::single_attempt())
		.await
		.unwrap();
	let mut events = connection.subscribe_events().unwrap();

	let response = connection
		.command(json!({"id": "sub-1", "command": "subscribe", "streams": ["ledger"]}))
		.await
		.unwrap();
	assert_eq!(response["id"], "sub-1");
	assert_eq!(response["status"], "success");

	// Messages without an id go to event subscribers
	server.push(json!({"type": "ledgerClosed", "ledger_index": 1}));

	let pushed = tokio::time::timeout(Duration::from_secs(2), events.recv())
		.await
		.unwrap()
		.unwrap();
	assert_eq!(pushed["type"], "ledgerClosed");

	connection.close().await;
	assert!(!connection.is_healthy());
	assert!(matches!(
		connection.command(json!({"id": "late", "command": "ping"})).await,
		Err(TransportError::Closed)
	));
}

#[tokio::test]
async fn test_pool_shares_and_releases_connections() {
	let server = TestWsServer::start().await;
	let pool = WsConnectionPool::new(WsConfig::single_attempt());

	let first = pool.acquire(&server.url, None).await.unwrap();
	let second = pool.acquire(&server.url, None).await.unwrap();
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(pool.lease_count(&server.url).await, 2);
	assert_eq!(server.connection_count(), 1);

	pool.release(&server.url, &first).await;
	assert!(second.is_healthy());
	assert_eq!(pool.lease_count(&server.url).await, 1);

	pool.release(&server.url, &second).await;
	assert!(pool.is_empty().await);
	assert!(!second.is_healthy());
}

#[tokio::test]
async fn test_pool_replaces_a_dead_connection() {
	let server = TestWsServer::start().await;
	let pool = WsConnectionPool::new(WsConfig::single_attempt());

	let first = pool.acquire(&server.url, None).await.unwrap();
	first.close().await;

	let second = pool.acquire(&server.url, None).await.unwrap();
	assert!(!Arc::ptr_eq(&first, &second));
	assert!(second.is_healthy());
	assert_eq!(server.connection_count(), 2);

	// The stale lease no longer affects the pool
	pool.release(&server.url, &first).await;
	assert_eq!(pool.lease_count(&server.url).await, 1);
}

#[tokio::test]
async fn test_acquire_fails_without_server() {
	let pool = WsConnectionPool::new(WsConfig::single_attempt());
	assert!(pool.acquire("ws://127.0.0.1:9", None).await.is_err());
	assert!(pool.is_empty().await);
}

#[tokio::test]
async fn test_topics_are_reference_counted() {
	let server = TestWsServer::start().await;
	let connection = WsConnection::connect(&server.url, None, &WsConfig::single_attempt())
		.await
		.unwrap();

	let a = "accounts:rA".to_string();
	let b = "accounts:rB".to_string();
	assert_eq!(connection.retain_topics(&[a.clone(), b.clone()]), vec![a.clone(), b.clone()]);
	assert_eq!(connection.retain_topics(&[a.clone()]), Vec::<String>::new());

	assert_eq!(connection.release_topics(&[a.clone(), b.clone()]), vec![b.clone()]);
	assert_eq!(connection.release_topics(&[a.clone()]), vec![a]);
	connection.close().await;
}
