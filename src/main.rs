//! Cross-chain transaction listener entry point.
//!
//! Loads a network profile and a filter, subscribes a listener on the profile's
//! network and logs every matching transaction until interrupted.
//!
//! # Flow
//! 1. Loads `.env` and installs logging
//! 2. Loads the network profile and the filter
//! 3. Initializes the default provider of the network
//! 4. Either probes the endpoints (`--check`) or subscribes and waits for Ctrl+C

use anyhow::{anyhow, bail, Context, Result};
use chain_listener::{
	bootstrap::{
		check_connections, create_error_callback, create_logging_callback, initialize_provider,
		load_profile, parse_filter,
	},
	services::{listener::Listener, provider::default_registry},
	utils::logging::setup_logging,
};
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::{error, info};

/// Watches a blockchain feed and logs transactions matching a filter
#[derive(Debug, Parser)]
#[command(name = "chain-listener", version, about)]
struct Cli {
	/// Path of the network profile (JSON)
	#[arg(long, value_name = "PROFILE")]
	network: PathBuf,

	/// Filter as inline JSON or path of a JSON file; required unless --check is set
	#[arg(long, value_name = "FILTER", required_unless_present = "check")]
	filter: Option<String>,

	/// Probe the RPC and WebSocket endpoints, then exit
	#[arg(long)]
	check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	dotenv().ok();
	setup_logging().map_err(|e| anyhow!(e)).context("Failed to setup logging")?;

	let profile = load_profile(&cli.network)
		.map_err(|e| anyhow!(e))
		.with_context(|| format!("Loading network profile {}", cli.network.display()))?;
	let provider = initialize_provider(default_registry(), &profile).map_err(|e| anyhow!(e))?;

	if cli.check {
		return check_connections(&provider)
			.await
			.map_err(|e| anyhow!(e))
			.context("Connection check failed");
	}

	let filter = match cli.filter.as_deref() {
		Some(filter) => parse_filter(filter)
			.map_err(|e| anyhow!(e))
			.context("Invalid filter")?,
		None => bail!("--filter is required"),
	};
	info!(slug = %profile.slug, category = %filter.category(), "Starting listener");

	let listener = Listener::new(&provider, filter)?;
	listener.on_error(create_error_callback());
	listener
		.on(create_logging_callback(provider.explorer_url().to_string()))
		.await?;

	info!("Listening. Press Ctrl+C to stop");
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!(error = %e, "Failed to listen for Ctrl+C");
	}

	info!("Shutting down");
	listener.stop().await;
	Ok(())
}
