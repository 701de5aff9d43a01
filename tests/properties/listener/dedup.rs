use crate::properties::strategies::id_sequence_strategy;
use chain_listener::services::listener::DedupLedger;
use proptest::{prelude::*, test_runner::Config};
use std::collections::HashSet;

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_each_id_is_accepted_once(ids in id_sequence_strategy()) {
		let mut ledger = DedupLedger::new();
		let accepted: Vec<&String> = ids.iter().filter(|id| ledger.insert(id)).collect();
		let distinct: HashSet<&String> = ids.iter().collect();

		prop_assert_eq!(accepted.len(), distinct.len());
		prop_assert_eq!(ledger.len(), distinct.len());
		for id in &ids {
			prop_assert!(ledger.contains(id));
			prop_assert!(!ledger.insert(id));
		}
	}

	#[test]
	fn test_first_occurrence_wins(ids in id_sequence_strategy()) {
		let mut ledger = DedupLedger::new();
		let mut seen = HashSet::new();
		for id in &ids {
			prop_assert_eq!(ledger.insert(id), seen.insert(id.clone()));
		}
	}
}
