//! Logging setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to the
//! application. The filter comes from `RUST_LOG` and falls back to `info`.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Directive used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// Builds the filter from `RUST_LOG`, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs a compact stdout subscriber as the global default
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(std::io::stdout)
}

/// Installs a compact subscriber writing to `writer` as the global default
///
/// Fails if a global subscriber has already been installed.
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry()
		.with(env_filter(DEFAULT_LOG_DIRECTIVE))
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_ansi(false)
						.compact(),
				),
		)
		.try_init()?;
	Ok(())
}
