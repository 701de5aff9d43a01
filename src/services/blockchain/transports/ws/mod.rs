//! Shared WebSocket transport.

mod config;
mod connection;
mod pool;

pub use config::WsConfig;
pub use connection::{message_id, WsConnection};
pub use pool::WsConnectionPool;
