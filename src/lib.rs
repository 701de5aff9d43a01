//! Cross-chain transaction event listener.
//!
//! A [`services::listener::Listener`] watches a live feed of one network (a push
//! subscription over WebSocket or timed polling over HTTP), matches incoming records
//! against a [`models::ListenerFilter`] and delivers each matching transaction at most
//! once to the registered callbacks.
//!
//! ```no_run
//! use chain_listener::{
//! 	models::{CoinFilter, ListenerFilter, NetworkConfig, NetworkKind},
//! 	services::{listener::Listener, provider::Provider},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::new(NetworkKind::Ledger, NetworkConfig::testnet())?;
//! let filter = ListenerFilter::Coin(CoinFilter {
//! 	receiver: Some("rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe".into()),
//! 	..Default::default()
//! });
//!
//! let listener = Listener::new(&provider, filter)?;
//! listener
//! 	.on(|tx| println!("received {}", tx.id()))
//! 	.await?;
//! # listener.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
