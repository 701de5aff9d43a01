//! Utility modules for common functionality.
//!
//! This module provides various utility functions and types that are used across
//! the application. Currently includes:
//!
//! - address: Case-insensitive address comparison
//! - constants: Constants for the application
//! - http: Retrying HTTP client construction
//! - logging: Logging utilities
//! - retry: Bounded retry of async operations
//! - units: Base unit to display amount conversion

pub mod address;
pub mod constants;
pub mod http;
pub mod logging;
pub mod retry;
pub mod tests;
pub mod units;

pub use retry::{RetryConfig, WithRetry};
