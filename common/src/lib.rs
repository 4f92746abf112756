pub mod abi;
pub mod api;
pub mod config;
pub mod crypto;
pub mod logger;
pub mod normalize;
pub mod time;
pub mod utils;

#[cfg(feature = "rpc-client")]
pub mod rpc;

// Re-exported so downstream crates use the same U256 as the codec
pub use primitive_types::U256;
