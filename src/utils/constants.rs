//! Default values shared across the crate.

/// Delay between two fetch attempts while a transaction is not yet indexed
pub const DEFAULT_FETCH_RETRY_DELAY_MS: u64 = 2_000;

/// Retries after the first fetch attempt
pub const DEFAULT_FETCH_MAX_RETRIES: u32 = 5;

/// Delay between two status reads while waiting for confirmation
pub const DEFAULT_WAIT_INTERVAL_MS: u64 = 4_000;

/// Overall bound of a wait for confirmation
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 120_000;

/// Interval between two polls of a poll based event source
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Timeout of a single HTTP request
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Capacity of the fan-out channel of a shared WebSocket connection
pub const DEFAULT_WS_CHANNEL_CAPACITY: usize = 1024;

/// Keccak hash of `Transfer(address,address,uint256)`, shared by ERC20 and ERC721
pub const TRANSFER_EVENT_TOPIC: &str =
	"0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Selector of `decimals()`
pub const DECIMALS_SELECTOR: &str = "0x313ce567";

/// Substrings of pushed error messages that mean the node is throttling us
pub const EVENTS_LIMIT_MARKERS: [&str; 3] = ["limit", "slowDown", "tooBusy"];
