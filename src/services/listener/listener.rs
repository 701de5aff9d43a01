//! The listener state machine.
//!
//! A listener starts `Idle`, becomes `Subscribed` on the first successful
//! [`Listener::on`] (or [`Listener::start`]) and ends `Stopped`. A stopped listener
//! cannot be restarted; create a new one instead.
//!
//! While subscribed, one worker task reads the event source sequentially. Records that
//! need the full transaction before they can be matched are completed on their own
//! task so that a slow read does not hold up the feed.

use futures::StreamExt;
use std::{
	any::Any,
	fmt,
	panic::{catch_unwind, AssertUnwindSafe},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex as StdMutex, PoisonError, RwLock,
	},
};
use tokio::{
	sync::{watch, Mutex},
	task::JoinHandle,
};

use crate::{
	models::{Category, DecodedRecord, ListenerConfig, ListenerFilter, NetworkKind, RawFeedRecord},
	services::{
		blockchain::ChainClient,
		listener::{DedupLedger, FeedError, ListenerError},
		matcher::{MatchOutcome, Matcher, SubscriptionPlan},
		provider::Provider,
		source::{create_event_source, EventSource, RecordStream},
		transaction::{ListenerTransaction, TransactionDataFetcher},
	},
};

/// Callback receiving every matched transaction
pub type TransactionCallback = Arc<dyn Fn(&ListenerTransaction) + Send + Sync>;

/// Callback receiving per-record errors
pub type ErrorCallback = Arc<dyn Fn(&FeedError) + Send + Sync>;

struct Worker {
	shutdown: watch::Sender<bool>,
	handle: JoinHandle<()>,
}

enum ListenerState {
	Idle,
	Subscribed(Worker),
	Stopped,
}

/// State shared between the listener handle, its worker and fetch tasks
struct Shared {
	category: Category,
	client: Arc<dyn ChainClient>,
	config: ListenerConfig,
	callbacks: RwLock<Vec<TransactionCallback>>,
	error_callbacks: RwLock<Vec<ErrorCallback>>,
	ledger: StdMutex<DedupLedger>,
	active: AtomicBool,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|s| s.to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "non-string panic payload".to_string())
}

impl Shared {
	fn fetcher(&self, id: &str) -> TransactionDataFetcher {
		TransactionDataFetcher::new(id, self.client.clone()).with_retry(self.config.fetch_retry.clone())
	}

	fn is_delivered(&self, id: &str) -> bool {
		self.ledger
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.contains(id)
	}

	fn report(&self, error: FeedError) {
		tracing::warn!(category = %self.category, error = %error, "Feed error");
		let callbacks = self
			.error_callbacks
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();
		for callback in callbacks {
			if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(&error))) {
				tracing::error!(panic = %panic_message(payload), "Error callback panicked");
			}
		}
	}

	/// Delivers a matched record once to every callback, in registration order
	fn trigger(&self, record: DecodedRecord, fetcher: TransactionDataFetcher) {
		if !self.active.load(Ordering::SeqCst) {
			return;
		}
		let fresh = self
			.ledger
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(&record.id);
		if !fresh {
			tracing::trace!(id = %record.id, "Already delivered");
			return;
		}

		let transaction = ListenerTransaction::from_record(self.category, record, fetcher);
		tracing::debug!(id = %transaction.id(), category = %self.category, "Delivering transaction");

		let callbacks = self
			.callbacks
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();
		for callback in callbacks {
			if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(&transaction))) {
				self.report(FeedError::CallbackPanicked(panic_message(payload)));
			}
		}
	}

	fn process(self: &Arc<Self>, matcher: &Arc<Matcher>, raw: RawFeedRecord) {
		let record = match matcher.extract(&raw) {
			Ok(Some(record)) => record,
			Ok(None) => return,
			Err(e) => return self.report(e),
		};

		match matcher.evaluate(&record) {
			MatchOutcome::Matched => {
				let fetcher = self.fetcher(&record.id);
				self.trigger(record, fetcher);
			}
			MatchOutcome::Rejected => {}
			MatchOutcome::NeedsFetch => {
				if !self.is_delivered(&record.id) {
					tokio::spawn(complete_and_trigger(self.clone(), matcher.clone(), record));
				}
			}
		}
	}
}

/// Waits for the transaction, completes the record from it and evaluates it again
async fn complete_and_trigger(shared: Arc<Shared>, matcher: Arc<Matcher>, mut record: DecodedRecord) {
	let fetcher = shared.fetcher(&record.id);
	if let Err(e) = fetcher.wait(shared.config.wait).await {
		return shared.report(e.into());
	}
	match fetcher.get_data().await {
		Ok(data) => matcher.complete(&mut record, data),
		Err(e) => return shared.report(e.into()),
	}

	// Still missing fields reject
	if matcher.evaluate(&record) == MatchOutcome::Matched {
		shared.trigger(record, fetcher);
	}
}

async fn run_feed(
	mut records: RecordStream,
	shared: Arc<Shared>,
	matcher: Arc<Matcher>,
	mut shutdown: watch::Receiver<bool>,
) {
	loop {
		tokio::select! {
			biased;
			_ = shutdown.changed() => break,
			next = records.next() => match next {
				Some(Ok(raw)) => shared.process(&matcher, raw),
				Some(Err(e)) => shared.report(e),
				None => {
					tracing::warn!(category = %shared.category, "Feed ended; stop this listener and create a new one to resubscribe");
					break;
				}
			}
		}
	}
}

/// Watches a network for transactions matching a filter
pub struct Listener {
	network: NetworkKind,
	filter: ListenerFilter,
	source: Arc<dyn EventSource>,
	shared: Arc<Shared>,
	state: Mutex<ListenerState>,
}

impl Listener {
	/// Creates a listener with the default configuration
	///
	/// # Errors
	/// * `ConfigurationError` - the filter is contradictory, or the provider lacks an
	///   endpoint the network needs
	pub fn new(provider: &Provider, filter: ListenerFilter) -> Result<Self, ListenerError> {
		Self::with_config(provider, filter, ListenerConfig::default())
	}

	pub fn with_config(
		provider: &Provider,
		filter: ListenerFilter,
		config: ListenerConfig,
	) -> Result<Self, ListenerError> {
		filter.validate().map_err(ListenerError::configuration_error)?;
		let source = create_event_source(provider, &config)?;
		let client = provider
			.chain_client()
			.map_err(|e| ListenerError::configuration_error(e.to_string()))?;
		Self::from_parts(provider.network(), filter, source, client, config)
	}

	/// Creates a listener from explicit collaborators
	pub fn from_parts(
		network: NetworkKind,
		filter: ListenerFilter,
		source: Arc<dyn EventSource>,
		client: Arc<dyn ChainClient>,
		config: ListenerConfig,
	) -> Result<Self, ListenerError> {
		filter.validate().map_err(ListenerError::configuration_error)?;
		Ok(Self {
			network,
			shared: Arc::new(Shared {
				category: filter.category(),
				client,
				config,
				callbacks: RwLock::new(Vec::new()),
				error_callbacks: RwLock::new(Vec::new()),
				ledger: StdMutex::new(DedupLedger::new()),
				active: AtomicBool::new(false),
			}),
			filter,
			source,
			state: Mutex::new(ListenerState::Idle),
		})
	}

	pub fn network(&self) -> NetworkKind {
		self.network
	}

	pub fn filter(&self) -> &ListenerFilter {
		&self.filter
	}

	fn check_capability(&self) -> Result<(), ListenerError> {
		let category = self.filter.category();
		if self.network.supports(category) {
			Ok(())
		} else {
			Err(ListenerError::not_implemented(self.network, category))
		}
	}

	/// Registers a callback and starts listening
	///
	/// # Returns
	/// * `Ok(true)` - the callback is registered and the listener is subscribed
	///
	/// # Errors
	/// * `Stopped` - the listener was stopped
	/// * `NotImplemented` - the category is not supported on this network; nothing
	///   was sent to the node
	/// * `ConnectionUnavailable` - the event source cannot be reached
	/// * any error of [`Listener::start`]
	pub async fn on<F>(&self, callback: F) -> Result<bool, ListenerError>
	where
		F: Fn(&ListenerTransaction) + Send + Sync + 'static,
	{
		let mut state = self.state.lock().await;
		if matches!(*state, ListenerState::Stopped) {
			return Err(ListenerError::Stopped);
		}
		self.check_capability()?;

		self.shared
			.callbacks
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(Arc::new(callback));

		// The state lock is still held, so the last callback is ours
		if let Err(e) = self.start_locked(&mut state).await {
			self.shared
				.callbacks
				.write()
				.unwrap_or_else(PoisonError::into_inner)
				.pop();
			return Err(e);
		}
		Ok(true)
	}

	/// Registers a callback for per-record errors
	pub fn on_error<F>(&self, callback: F)
	where
		F: Fn(&FeedError) + Send + Sync + 'static,
	{
		self.shared
			.error_callbacks
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(Arc::new(callback));
	}

	/// Subscribes to the feed; a no-op while already subscribed
	pub async fn start(&self) -> Result<(), ListenerError> {
		let mut state = self.state.lock().await;
		self.start_locked(&mut state).await
	}

	async fn start_locked(&self, state: &mut ListenerState) -> Result<(), ListenerError> {
		match state {
			ListenerState::Subscribed(_) => return Ok(()),
			ListenerState::Stopped => return Err(ListenerError::Stopped),
			ListenerState::Idle => {}
		}

		self.check_capability()?;
		self.filter
			.validate()
			.map_err(ListenerError::configuration_error)?;
		let matcher = Matcher::new(self.network, self.filter.clone());
		let plan = matcher.plan()?;

		self.source
			.connect()
			.await
			.map_err(|e| ListenerError::connection_unavailable(e.to_string()))?;

		// The source holds a lease from here on; hand it back if subscribing fails
		let (matcher, records) = match self.subscribe(matcher, &plan).await {
			Ok(subscribed) => subscribed,
			Err(e) => {
				self.source.close().await;
				return Err(e);
			}
		};

		let (shutdown, shutdown_rx) = watch::channel(false);
		self.shared.active.store(true, Ordering::SeqCst);
		let handle = tokio::spawn(run_feed(
			records,
			self.shared.clone(),
			Arc::new(matcher),
			shutdown_rx,
		));
		*state = ListenerState::Subscribed(Worker { shutdown, handle });

		tracing::info!(
			network = %self.network,
			category = %plan.category,
			id = %plan.id,
			"Listener subscribed"
		);
		Ok(())
	}

	/// Reads what the matcher needs from the node, then opens the feed
	async fn subscribe(
		&self,
		mut matcher: Matcher,
		plan: &SubscriptionPlan,
	) -> Result<(Matcher, RecordStream), ListenerError> {
		if matcher.needs_token_decimals() {
			let address = self.filter.address().unwrap_or_default();
			let decimals = self
				.shared
				.client
				.get_token_decimals(address)
				.await
				.map_err(|e| {
					ListenerError::subscription_error(format!(
						"Cannot read decimals of token {}: {}",
						address, e
					))
				})?;
			matcher = matcher.with_token_decimals(decimals);
		}

		let records = self.source.open(plan).await?;
		Ok((matcher, records))
	}

	/// Stops the feed and releases the transport; calling it again is a no-op
	///
	/// Transactions still being fetched are no longer delivered.
	pub async fn stop(&self) {
		let mut state = self.state.lock().await;
		match std::mem::replace(&mut *state, ListenerState::Stopped) {
			ListenerState::Subscribed(worker) => {
				self.shared.active.store(false, Ordering::SeqCst);
				let _ = worker.shutdown.send(true);
				if let Err(e) = worker.handle.await {
					tracing::warn!(error = %e, "Feed worker ended abnormally");
				}
				self.source.close().await;
				tracing::info!(network = %self.network, category = %self.filter.category(), "Listener stopped");
			}
			ListenerState::Idle => self.source.close().await,
			ListenerState::Stopped => {}
		}
	}

	/// `true` while subscribed
	pub fn get_status(&self) -> bool {
		self.shared.active.load(Ordering::SeqCst)
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		if let ListenerState::Subscribed(worker) = self.state.get_mut() {
			self.shared.active.store(false, Ordering::SeqCst);
			let _ = worker.shutdown.send(true);
			worker.handle.abort();

			// Give the transport back without blocking the dropping thread
			if let Ok(runtime) = tokio::runtime::Handle::try_current() {
				let source = self.source.clone();
				runtime.spawn(async move { source.close().await });
			}
		}
	}
}

impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Listener")
			.field("network", &self.network)
			.field("filter", &self.filter)
			.field("active", &self.get_status())
			.finish()
	}
}
