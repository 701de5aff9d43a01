//! Test helper utilities
//!
//! - `builders`: Builders for test instances of filters and network profiles

pub mod builders {
	pub mod filter;
	pub mod network;
}

pub use builders::*;
pub use builders::{filter::FilterBuilder, network::NetworkProfileBuilder};
