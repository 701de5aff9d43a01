//! Transaction listeners.
//!
//! - [`Listener`]: subscribes to a network feed and delivers matched transactions
//! - [`DedupLedger`]: ids a listener already delivered
//! - [`ListenerError`] / [`FeedError`]: setup errors and per-record errors

mod error;
mod ledger;
#[allow(clippy::module_inception)]
mod listener;

pub use error::{FeedError, ListenerError};
pub use ledger::DedupLedger;
pub use listener::{ErrorCallback, Listener, TransactionCallback};
