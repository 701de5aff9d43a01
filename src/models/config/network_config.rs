use std::path::Path;

use crate::models::{ConfigLoader, NetworkProfile};

use super::error::ConfigError;

impl ConfigLoader for NetworkProfile {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let network_dir = path.unwrap_or(Path::new("config/networks"));
		let mut pairs = Vec::new();

		if !network_dir.exists() {
			return Err(ConfigError::file_error("networks directory not found"));
		}

		for entry in std::fs::read_dir(network_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			let name = path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("unknown")
				.to_string();

			match Self::load_from_path(&path) {
				Ok(profile) => pairs.push((name, profile)),
				Err(e) => tracing::warn!(file = %path.display(), error = %e, "Skipping network profile"),
			}
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path).map_err(|e| ConfigError::from(e).in_file(path))?;
		let config: NetworkProfile =
			serde_json::from_reader(file).map_err(|e| ConfigError::from(e).in_file(path))?;

		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error).in_file(path));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		if self.slug.is_empty()
			|| !self
				.slug
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return Err(
				"Slug must contain only lowercase letters, numbers, and underscores".to_string(),
			);
		}

		if let Some(rpc) = &self.config.rpc_endpoint {
			if !(rpc.starts_with("http://") || rpc.starts_with("https://")) {
				return Err("RPC endpoint must start with http:// or https://".to_string());
			}
		}

		if let Some(ws) = &self.config.ws_endpoint {
			if !(ws.starts_with("ws://") || ws.starts_with("wss://")) {
				return Err("WebSocket endpoint must start with ws:// or wss://".to_string());
			}
		}

		if matches!(&self.config.auth_token, Some(token) if token.trim().is_empty()) {
			return Err("Auth token must not be empty when set".to_string());
		}

		Ok(())
	}
}
