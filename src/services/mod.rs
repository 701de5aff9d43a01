//! Core services of the listener.
//!
//! - `blockchain`: transports and per-network chain clients
//! - `provider`: endpoints and shared connections of a network
//! - `transaction`: bounded-retry transaction reads
//! - `matcher`: extraction and matching of feed records
//! - `source`: push and poll record feeds
//! - `listener`: the listener state machine

pub mod blockchain;
pub mod listener;
pub mod matcher;
pub mod provider;
pub mod source;
pub mod transaction;
