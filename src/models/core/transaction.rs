use serde::{Deserialize, Serialize};
use std::fmt;

/// Finality status of a transaction as reported by the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
	/// Not yet included, or included but not final
	Pending,
	/// Final and successful
	Confirmed,
	/// Final and reverted or rejected
	Failed,
}

impl fmt::Display for TransactionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Pending => "pending",
			Self::Confirmed => "confirmed",
			Self::Failed => "failed",
		};
		write!(f, "{}", name)
	}
}
