//! Configuration loading and validation.
//!
//! Network profiles are stored as JSON files and loaded through the [`ConfigLoader`]
//! trait. Listener tuning lives in [`ListenerConfig`].

use std::path::Path;

mod error;
mod listener_config;
mod network_config;

pub use error::ConfigError;
pub use listener_config::{ListenerConfig, WaitOptions};

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	/// Loads every valid configuration file from a directory
	///
	/// # Arguments
	/// * `path` - Directory to read, or the loader's default directory when `None`
	///
	/// # Returns
	/// * `Result<T, ConfigError>` - Collection of (name, config) pairs or an error
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	/// Loads and validates a single configuration file
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self) -> Result<(), String>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
