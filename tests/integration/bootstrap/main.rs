use chain_listener::{
	bootstrap::{check_connections, initialize_provider, load_profile, parse_filter},
	models::{Category, NetworkKind},
	services::provider::{Provider, ProviderRegistry},
	utils::tests::NetworkProfileBuilder,
};
use mockito::Matcher;
use serde_json::json;
use std::io::Write;

use crate::integration::mocks::TestWsServer;

#[tokio::test]
async fn test_check_connections_probes_both_endpoints() {
	let ws = TestWsServer::start().await;
	let mut rpc = mockito::Server::new_async().await;
	let server_info = rpc
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({"method": "server_info"})))
		.with_status(200)
		.with_body(json!({"result": {"status": "success", "info": {}}}).to_string())
		.expect(1)
		.create_async()
		.await;

	let profile = NetworkProfileBuilder::new()
		.ws_endpoint(&ws.url)
		.rpc_endpoint(&rpc.url())
		.build();
	let provider = Provider::new(profile.network, profile.config).unwrap();

	check_connections(&provider).await.unwrap();
	server_info.assert_async().await;
	assert_eq!(ws.connection_count(), 1);
}

#[tokio::test]
async fn test_check_connections_reports_unreachable_rpc() {
	let ws = TestWsServer::start().await;
	let mut rpc = mockito::Server::new_async().await;
	let _unavailable = rpc
		.mock("POST", "/")
		.with_status(503)
		.with_body("maintenance")
		.create_async()
		.await;

	let profile = NetworkProfileBuilder::new()
		.ws_endpoint(&ws.url)
		.rpc_endpoint(&rpc.url())
		.build();
	let provider = Provider::new(profile.network, profile.config).unwrap();

	assert!(check_connections(&provider).await.is_err());
	// The WebSocket probe still ran
	assert_eq!(ws.connection_count(), 1);
}

#[test]
fn test_profile_and_filter_from_files() {
	let dir = tempfile::tempdir().unwrap();

	let profile_path = dir.path().join("evm_local.json");
	std::fs::write(
		&profile_path,
		json!({
			"slug": "evm_local",
			"network": "evm",
			"testnet": true,
			"rpc_endpoint": "http://127.0.0.1:8545",
			"ws_endpoint": "ws://127.0.0.1:8546"
		})
		.to_string(),
	)
	.unwrap();

	let mut filter_file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
	write!(
		filter_file,
		"{}",
		json!({"category": "token", "address": "0xA0b86991c6218b36c1d19d4a2e9eB0cE3606eB48", "amount": "1.5"})
	)
	.unwrap();

	let profile = load_profile(&profile_path).unwrap();
	assert_eq!(profile.network, NetworkKind::Evm);

	let filter = parse_filter(filter_file.path().to_str().unwrap()).unwrap();
	assert_eq!(filter.category(), Category::Token);

	let registry = ProviderRegistry::new();
	let provider = initialize_provider(&registry, &profile).unwrap();
	assert_eq!(provider.rpc_url(), "http://127.0.0.1:8545");
	assert_eq!(provider.ws_url(), Some("ws://127.0.0.1:8546"));
	assert!(registry.instance(NetworkKind::Evm).is_ok());
	assert!(registry.instance(NetworkKind::Utxo).is_err());
}
