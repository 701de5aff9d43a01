//! Errors raised while loading network profiles.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
	/// The file parsed but its content is inconsistent
	#[error("Invalid network profile: {0}")]
	ValidationError(String),

	#[error("Malformed network profile: {0}")]
	ParseError(String),

	#[error("Cannot read network profile: {0}")]
	FileError(String),
}

impl ConfigError {
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn parse_error(msg: impl Into<String>) -> Self {
		let error = Self::ParseError(msg.into());
		tracing::error!("{}", error);
		error
	}

	pub fn file_error(msg: impl Into<String>) -> Self {
		let error = Self::FileError(msg.into());
		tracing::error!("{}", error);
		error
	}

	/// Prefixes the message with the file the error came from
	pub fn in_file(self, path: &Path) -> Self {
		let prefix = |msg: String| format!("{}: {}", path.display(), msg);
		match self {
			Self::ValidationError(msg) => Self::ValidationError(prefix(msg)),
			Self::ParseError(msg) => Self::ParseError(prefix(msg)),
			Self::FileError(msg) => Self::FileError(prefix(msg)),
		}
	}
}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		Self::file_error(err.to_string())
	}
}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		Self::parse_error(err.to_string())
	}
}
