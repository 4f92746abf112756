use primitive_types::U256;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 18 decimals numbers, the native currency granularity of the network
pub const COIN_DECIMALS: u8 = 18;

// 1 000 000 000 000 000 000 base units to represent 1 coin
pub fn coin_value() -> U256 {
    U256::exp10(COIN_DECIMALS as usize)
}

// Percentage added on top of the nightly total when booking.
// The contract exposes its own `securityFee()` value which is not
// reconciled with this one, see `FeePolicy` in the client crate.
pub const SECURITY_FEE_PERCENT: u64 = 5;

// Images are stored on-chain as a single delimited string
pub const IMAGES_SEPARATOR: &str = ",";

// One booked night
pub const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

// JSON-RPC endpoint used when no wallet is available
pub const DEFAULT_FALLBACK_RPC_URL: &str = "http://127.0.0.1:8545";

// Receipt polling interval while waiting for a confirmation
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 1000;

// HTTP request timeout applied by the JSON-RPC transport
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Key of the contract address in the deployment JSON file
pub const CONTRACT_ADDRESS_KEY: &str = "dappBanXContract";
