//! Domain models and data structures for the listener.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (networks, filters, transaction status)
//! - `feed`: Records produced by event sources

mod config;
mod core;
mod feed;

pub use core::{
	Category, CoinFilter, ContractFilter, GeneralFilter, ListenerFilter, NetworkConfig,
	NetworkKind, NetworkProfile, NftFilter, TokenFilter, TransactionStatus, TransportKind,
};

pub use feed::{DecodedRecord, RawFeedRecord};

pub use config::{ConfigError, ConfigLoader, ListenerConfig, WaitOptions};
