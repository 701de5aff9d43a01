//! Record of transaction ids already delivered by a listener.

use std::collections::HashSet;

/// Append-only set of delivered transaction ids
///
/// Lives as long as its listener; nothing is ever removed.
#[derive(Debug, Default)]
pub struct DedupLedger {
	delivered: HashSet<String>,
}

impl DedupLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `id`, returning `false` if it was already delivered
	pub fn insert(&mut self, id: &str) -> bool {
		if self.delivered.contains(id) {
			return false;
		}
		self.delivered.insert(id.to_string())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.delivered.contains(id)
	}

	pub fn len(&self) -> usize {
		self.delivered.len()
	}

	pub fn is_empty(&self) -> bool {
		self.delivered.is_empty()
	}
}
