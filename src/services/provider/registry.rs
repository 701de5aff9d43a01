//! Process wide default providers.
//!
//! Only the application boundary uses this; library code receives a [`Provider`]
//! explicitly.

use lazy_static::lazy_static;
use std::{
	collections::HashMap,
	sync::{Arc, PoisonError, RwLock},
};

use crate::{
	models::{NetworkConfig, NetworkKind},
	services::provider::{Provider, ProviderError},
};

lazy_static! {
	static ref DEFAULT_REGISTRY: ProviderRegistry = ProviderRegistry::new();
}

/// Registry shared by the whole process
pub fn default_registry() -> &'static ProviderRegistry {
	&DEFAULT_REGISTRY
}

/// One default provider per network kind
#[derive(Default)]
pub struct ProviderRegistry {
	providers: RwLock<HashMap<NetworkKind, Arc<Provider>>>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs the default provider of `network`
	///
	/// # Errors
	/// * `ProviderError::AlreadyInitialized` - A default already exists
	/// * `ProviderError::InvalidEndpoint` - The configuration is unusable
	pub fn initialize(
		&self,
		network: NetworkKind,
		config: NetworkConfig,
	) -> Result<Arc<Provider>, ProviderError> {
		let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
		if providers.contains_key(&network) {
			return Err(ProviderError::AlreadyInitialized(network));
		}
		let provider = Arc::new(Provider::new(network, config)?);
		providers.insert(network, provider.clone());
		tracing::info!(%network, "Default provider initialized");
		Ok(provider)
	}

	/// Returns the default provider of `network`
	///
	/// # Errors
	/// * `ProviderError::NotInitialized` - Nothing was installed yet
	pub fn instance(&self, network: NetworkKind) -> Result<Arc<Provider>, ProviderError> {
		self.providers
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&network)
			.cloned()
			.ok_or(ProviderError::NotInitialized(network))
	}

	/// Re-derives the provider from `config` and installs it as the new default
	///
	/// Listeners built from the previous default keep using it. The connection pool
	/// is carried over so that the same endpoints still share connections.
	pub fn update(
		&self,
		network: NetworkKind,
		config: NetworkConfig,
	) -> Result<Arc<Provider>, ProviderError> {
		let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
		let provider = match providers.get(&network) {
			Some(current) => {
				let mut next = Provider::clone(current);
				next.update(config)?;
				next
			}
			None => Provider::new(network, config)?,
		};
		let provider = Arc::new(provider);
		providers.insert(network, provider.clone());
		tracing::info!(%network, "Default provider updated");
		Ok(provider)
	}
}
