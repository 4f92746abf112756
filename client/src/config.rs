use banx_common::{
    config::{
        CONTRACT_ADDRESS_KEY, DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_FALLBACK_RPC_URL,
        DEFAULT_REQUEST_TIMEOUT_SECS,
    },
    crypto::{Address, AddressError},
    rpc::RpcError,
};
use log::{debug, info};
use serde_json::Value;
use std::{fs, path::Path, sync::Arc, time::Duration};
use thiserror::Error;

use crate::{
    booking::FeePolicy,
    connectivity::{ConnectivityResolver, InjectedWallet},
    contract::ContractFactory,
    provider::HttpProvider,
};

#[cfg(feature = "cli")]
use banx_common::logger::{default_logs_datetime_format, LogLevel, LoggerSettings};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error while reading {}: {}", _0, _1)]
    Io(String, std::io::Error),
    #[error("Invalid JSON in {}: {}", _0, _1)]
    Json(String, serde_json::Error),
    #[error("No '{}' entry in {}", CONTRACT_ADDRESS_KEY, _0)]
    MissingAddressKey(String),
    #[error("Invalid contract address: {}", _0)]
    InvalidAddress(#[from] AddressError),
    #[error("No contract address configured")]
    MissingContractAddress,
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

// Contract address from a deployment file: {"dappBanXContract": "0x.."}
pub fn load_contract_address<P: AsRef<Path>>(path: P) -> Result<Address, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(display.clone(), e))?;
    let value: Value =
        serde_json::from_str(&content).map_err(|e| ConfigError::Json(display.clone(), e))?;

    let address = value
        .get(CONTRACT_ADDRESS_KEY)
        .and_then(Value::as_str)
        .ok_or(ConfigError::MissingAddressKey(display))?;

    Ok(address.parse()?)
}

// Everything needed to reach the contract, immutable once built
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // Endpoint with authorized accounts, standing in for an injected wallet
    pub wallet_rpc_url: Option<String>,
    // Read-only endpoint used when no wallet account is available
    pub fallback_rpc_url: String,
    pub contract_address: Address,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub fee_policy: FeePolicy,
}

impl ClientConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            wallet_rpc_url: None,
            fallback_rpc_url: DEFAULT_FALLBACK_RPC_URL.to_owned(),
            contract_address,
            poll_interval: Duration::from_millis(DEFAULT_CONFIRMATION_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            fee_policy: FeePolicy::default(),
        }
    }

    pub fn build_resolver(&self) -> Result<ConnectivityResolver, ConfigError> {
        let fallback = HttpProvider::with_timeout(&self.fallback_rpc_url, self.request_timeout)?;
        let wallet = match self.wallet_rpc_url.as_deref() {
            Some(url) => {
                debug!("Using wallet endpoint {}", url);
                let provider = HttpProvider::with_timeout(url, self.request_timeout)?;
                Some(InjectedWallet::new(Arc::new(provider)))
            }
            None => None,
        };

        Ok(ConnectivityResolver::new(wallet, Arc::new(fallback)))
    }

    pub fn build_factory(&self) -> Result<ContractFactory, ConfigError> {
        let resolver = self.build_resolver()?;
        info!("Using contract {}", self.contract_address);
        Ok(ContractFactory::new(
            Arc::new(resolver),
            self.contract_address,
            self.poll_interval,
        ))
    }
}

// serde and clap defaults
#[cfg(feature = "cli")]
fn default_fallback_rpc_url() -> String {
    DEFAULT_FALLBACK_RPC_URL.to_owned()
}

#[cfg(feature = "cli")]
fn default_poll_interval_ms() -> u64 {
    DEFAULT_CONFIRMATION_POLL_INTERVAL_MS
}

#[cfg(feature = "cli")]
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[cfg(feature = "cli")]
fn default_log_filename() -> String {
    String::from("banx.log")
}

#[cfg(feature = "cli")]
fn default_logs_path() -> String {
    String::from("logs/")
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Wallet endpoint holding the authorized accounts
    #[clap(long)]
    pub wallet_rpc_url: Option<String>,
    /// Read-only endpoint used when no wallet account is available
    #[clap(long, default_value_t = default_fallback_rpc_url())]
    #[serde(default = "default_fallback_rpc_url")]
    pub fallback_rpc_url: String,
    /// DappBanX contract address, 0x prefixed
    #[clap(long)]
    pub contract_address: Option<String>,
    /// JSON file containing the contract address under "dappBanXContract"
    #[clap(long)]
    pub contract_address_file: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Console log level
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Level for the log file, the console level when unset
    #[clap(long, value_enum)]
    pub file_log_level: Option<LogLevel>,
    /// Also write logs to a file under `logs_path`
    #[clap(long)]
    #[serde(default)]
    pub enable_file_logging: bool,
    /// Keep a single log file instead of one prefixed by the day
    #[clap(long)]
    #[serde(default)]
    pub disable_file_log_date_based: bool,
    /// Plain console output without ANSI colors
    #[clap(long)]
    #[serde(default)]
    pub disable_log_color: bool,
    /// Name of the log file
    #[clap(long, default_value_t = default_log_filename())]
    #[serde(default = "default_log_filename")]
    pub filename_log: String,
    /// Directory receiving the log files, with a trailing slash
    #[clap(long, default_value_t = default_logs_path())]
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    /// chrono format of the timestamp prefixing each record
    #[clap(long, default_value_t = default_logs_datetime_format())]
    #[serde(default = "default_logs_datetime_format")]
    pub datetime_format: String,
}

#[cfg(feature = "cli")]
impl LogConfig {
    pub fn to_logger_settings(&self) -> LoggerSettings {
        LoggerSettings {
            level: self.log_level,
            file_level: self.file_log_level,
            file_logging: self.enable_file_logging,
            date_based_file: !self.disable_file_log_date_based,
            logs_path: self.logs_path.clone(),
            filename: self.filename_log.clone(),
            colors: !self.disable_log_color,
            datetime_format: self.datetime_format.clone(),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct Config {
    /// Endpoints and contract address
    #[clap(flatten)]
    pub network: NetworkConfig,
    /// Console and file logging
    #[clap(flatten)]
    pub log: LogConfig,
    /// Interval between two receipt polls, in milliseconds
    #[clap(long, default_value_t = DEFAULT_CONFIRMATION_POLL_INTERVAL_MS)]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Timeout of a single RPC request, in seconds
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Fixed security fee percentage added to booking payments
    #[clap(long)]
    pub security_fee_percent: Option<u64>,
    /// Read the security fee percentage from the contract instead
    #[clap(long, conflicts_with = "security_fee_percent")]
    #[serde(default)]
    pub contract_security_fee: bool,
    /// Read every option from this JSON file instead of the command line
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub config_file: Option<String>,
    /// Write the current options as JSON to `config_file` and exit
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub generate_config_template: bool,
}

#[cfg(feature = "cli")]
impl Config {
    pub fn fee_policy(&self) -> FeePolicy {
        match (self.contract_security_fee, self.security_fee_percent) {
            (true, _) => FeePolicy::Contract,
            (false, Some(percent)) => FeePolicy::Fixed(percent),
            (false, None) => FeePolicy::default(),
        }
    }

    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        if let Some(address) = self.network.contract_address.as_deref() {
            return Ok(address.parse()?);
        }

        match self.network.contract_address_file.as_deref() {
            Some(path) => load_contract_address(path),
            None => Err(ConfigError::MissingContractAddress),
        }
    }

    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        Ok(ClientConfig {
            wallet_rpc_url: self.network.wallet_rpc_url.clone(),
            fallback_rpc_url: self.network.fallback_rpc_url.clone(),
            contract_address: self.contract_address()?,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            fee_policy: self.fee_policy(),
        })
    }
}
