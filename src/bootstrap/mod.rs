//! Bootstrap helpers for the listener binary.
//!
//! Loads the network profile and the filter given on the command line, installs the
//! default provider and builds the callbacks the binary registers.

use std::{error::Error, path::Path, sync::Arc};

use crate::{
	models::{ConfigLoader, ListenerFilter, NetworkProfile},
	services::{
		listener::FeedError,
		provider::{Provider, ProviderRegistry},
		transaction::ListenerTransaction,
	},
};

/// Type alias for handling bootstrap results
pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// Name of the environment variable holding the auth token of `slug`
///
/// `ledger_testnet` reads `LEDGER_TESTNET_AUTH_TOKEN`.
pub fn auth_token_variable(slug: &str) -> String {
	format!("{}_AUTH_TOKEN", slug.to_uppercase())
}

/// Loads a network profile, taking the auth token from the environment when the file
/// has none
pub fn load_profile(path: &Path) -> Result<NetworkProfile> {
	let mut profile = NetworkProfile::load_from_path(path)?;
	if profile.config.auth_token.is_none() {
		let variable = auth_token_variable(&profile.slug);
		if let Ok(token) = std::env::var(&variable) {
			if !token.trim().is_empty() {
				tracing::debug!(%variable, "Using auth token from environment");
				profile.config.auth_token = Some(token);
			}
		}
	}
	Ok(profile)
}

/// Parses a filter given either inline as JSON or as the path of a JSON file
pub fn parse_filter(input: &str) -> Result<ListenerFilter> {
	let trimmed = input.trim();
	let json = if trimmed.starts_with('{') {
		trimmed.to_string()
	} else {
		std::fs::read_to_string(trimmed)
			.map_err(|e| format!("Cannot read filter file {}: {}", trimmed, e))?
	};

	let filter: ListenerFilter = serde_json::from_str(&json)?;
	filter.validate()?;
	Ok(filter)
}

/// Installs the profile's provider as the default of its network kind
pub fn initialize_provider(
	registry: &ProviderRegistry,
	profile: &NetworkProfile,
) -> Result<Arc<Provider>> {
	let provider = registry.initialize(profile.network, profile.config.clone())?;
	tracing::info!(
		slug = %profile.slug,
		rpc = %provider.rpc_url(),
		ws = ?provider.ws_url(),
		explorer = %provider.explorer_url(),
		"Provider ready"
	);
	Ok(provider)
}

/// Probes both endpoints of the provider
///
/// Every probe runs even if an earlier one failed.
pub async fn check_connections(provider: &Provider) -> Result<()> {
	let rpc = provider.check_rpc_connection(None).await;
	match &rpc {
		Ok(()) => tracing::info!(url = %provider.rpc_url(), "RPC endpoint reachable"),
		Err(e) => tracing::error!(error = %e, "RPC endpoint unreachable"),
	}

	let ws = match provider.ws_url() {
		Some(url) => {
			let result = provider.check_ws_connection(None).await;
			match &result {
				Ok(()) => tracing::info!(%url, "WebSocket endpoint reachable"),
				Err(e) => tracing::error!(error = %e, "WebSocket endpoint unreachable"),
			}
			result
		}
		None => Ok(()),
	};

	rpc?;
	ws?;
	Ok(())
}

/// Callback logging every delivered transaction with its category fields
pub fn create_logging_callback(
	explorer_url: String,
) -> impl Fn(&ListenerTransaction) + Send + Sync + 'static {
	move |transaction| {
		let link = format!("{}/tx/{}", explorer_url.trim_end_matches('/'), transaction.id());
		match transaction {
			ListenerTransaction::General(_) => {
				tracing::info!(id = %transaction.id(), %link, "Transaction");
			}
			ListenerTransaction::Contract(tx) => {
				tracing::info!(id = %transaction.id(), contract = ?tx.address(), %link, "Contract interaction");
			}
			ListenerTransaction::Coin(tx) => {
				tracing::info!(
					id = %transaction.id(),
					sender = ?tx.sender(),
					receiver = ?tx.receiver(),
					amount = ?tx.amount(),
					%link,
					"Coin transfer"
				);
			}
			ListenerTransaction::Token(tx) => {
				tracing::info!(
					id = %transaction.id(),
					token = ?tx.address(),
					sender = ?tx.sender(),
					receiver = ?tx.receiver(),
					amount = ?tx.amount(),
					%link,
					"Token transfer"
				);
			}
			ListenerTransaction::Nft(tx) => {
				tracing::info!(
					id = %transaction.id(),
					collection = ?tx.address(),
					sender = ?tx.sender(),
					receiver = ?tx.receiver(),
					nft_id = ?tx.nft_id(),
					%link,
					"NFT transfer"
				);
			}
		}
	}
}

/// Callback logging per-record errors
pub fn create_error_callback() -> impl Fn(&FeedError) + Send + Sync + 'static {
	|error| match error {
		FeedError::EventsLimitReached(_) => {
			tracing::error!(%error, "Node is throttling this listener")
		}
		_ => tracing::debug!(%error, "Record skipped"),
	}
}
