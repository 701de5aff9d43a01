//! Poll source for UTXO chains behind an Esplora REST API.
//!
//! Every `poll_interval` the address history is read and compared with the txids
//! already seen. The first successful poll only records the baseline; afterwards new
//! txids are emitted oldest first.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::Value;
use std::{
	collections::{HashSet, VecDeque},
	sync::Arc,
	time::Duration,
};
use tokio::time::{interval, Interval, MissedTickBehavior};

use super::{EventSource, RecordStream};
use crate::{
	models::{NetworkKind, RawFeedRecord},
	services::{
		blockchain::{TransportError, UtxoClient},
		listener::{FeedError, ListenerError},
		matcher::{SubscriptionPlan, SubscriptionRequest},
	},
};

pub struct UtxoSource {
	client: Arc<UtxoClient>,
	poll_interval: Duration,
}

impl UtxoSource {
	pub fn new(client: Arc<UtxoClient>, poll_interval: Duration) -> Self {
		Self {
			client,
			poll_interval,
		}
	}
}

struct PollState {
	client: Arc<UtxoClient>,
	address: String,
	timer: Interval,
	seen: HashSet<String>,
	baseline_taken: bool,
	ready: VecDeque<Value>,
}

impl PollState {
	/// Records the txids of one poll and queues the unseen ones, oldest first
	fn absorb(&mut self, transactions: Vec<Value>) {
		let mut fresh = Vec::new();
		for tx in transactions {
			let Some(txid) = tx.get("txid").and_then(Value::as_str) else {
				continue;
			};
			if self.seen.insert(txid.to_string()) && self.baseline_taken {
				fresh.push(tx);
			}
		}
		if !self.baseline_taken {
			tracing::debug!(address = %self.address, known = self.seen.len(), "Poll baseline taken");
			self.baseline_taken = true;
		}
		// Esplora lists newest first
		self.ready.extend(fresh.into_iter().rev());
	}

	async fn next(mut self) -> Option<(Result<RawFeedRecord, FeedError>, Self)> {
		loop {
			if let Some(tx) = self.ready.pop_front() {
				return Some((Ok(RawFeedRecord::new(NetworkKind::Utxo, tx)), self));
			}

			self.timer.tick().await;
			match self.client.get_address_transactions(&self.address).await {
				Ok(transactions) => self.absorb(transactions),
				Err(e) => {
					tracing::warn!(address = %self.address, error = %e, "Poll failed");
					return Some((Err(poll_error(e)), self));
				}
			}
		}
	}
}

fn poll_error(error: TransportError) -> FeedError {
	if error.is_rate_limited() {
		FeedError::EventsLimitReached(error.to_string())
	} else {
		FeedError::Transport(error.to_string())
	}
}

#[async_trait]
impl EventSource for UtxoSource {
	fn network(&self) -> NetworkKind {
		NetworkKind::Utxo
	}

	/// Polling keeps no connection open; this only checks the API answers
	async fn connect(&self) -> Result<(), TransportError> {
		let height = self.client.tip_height().await?;
		tracing::debug!(height, "Esplora API reachable");
		Ok(())
	}

	async fn open(&self, plan: &SubscriptionPlan) -> Result<RecordStream, ListenerError> {
		let SubscriptionRequest::UtxoAddress { address } = &plan.request else {
			return Err(ListenerError::configuration_error(format!(
				"utxo source cannot serve {:?}",
				plan.request
			)));
		};

		let mut timer = interval(self.poll_interval);
		timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let state = PollState {
			client: self.client.clone(),
			address: address.clone(),
			timer,
			seen: HashSet::new(),
			baseline_taken: false,
			ready: VecDeque::new(),
		};

		tracing::info!(id = %plan.id, %address, interval = ?self.poll_interval, "Polling address");
		Ok(stream::unfold(state, PollState::next).boxed())
	}

	/// Dropping the stream stops the timer
	async fn close(&self) {}
}
