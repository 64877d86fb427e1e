use alloy::primitives::Address;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::domain::TargetChain;
use crate::error::{ClaimError, Result};
use crate::services::PollConfig;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Target chain id (Base Sepolia by default)
    #[serde(default = "default_chain_id")]
    pub id: u64,
    #[serde(default = "default_chain_name")]
    pub name: String,
    /// RPC endpoint announced when registering the chain with the wallet
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    #[serde(default = "default_currency")]
    pub currency_name: String,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,
}

fn default_chain_id() -> u64 {
    84532
}

fn default_chain_name() -> String {
    "Base Sepolia".to_string()
}

fn default_rpc_url() -> String {
    "https://sepolia.base.org".to_string()
}

fn default_explorer_url() -> String {
    "https://sepolia.basescan.org".to_string()
}

fn default_currency() -> String {
    "ETH".to_string()
}

fn default_currency_decimals() -> u8 {
    18
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            id: default_chain_id(),
            name: default_chain_name(),
            rpc_url: default_rpc_url(),
            explorer_url: default_explorer_url(),
            currency_name: default_currency(),
            currency_symbol: default_currency(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

impl ChainConfig {
    pub fn target_chain(&self) -> TargetChain {
        TargetChain {
            id: self.id,
            name: self.name.clone(),
            currency_name: self.currency_name.clone(),
            currency_symbol: self.currency_symbol.clone(),
            currency_decimals: self.currency_decimals,
            rpc_url: self.rpc_url.clone(),
            explorer_url: self.explorer_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewardsConfig {
    /// Rewards contract exposing `claimReward()`
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Paymaster service URL passed to the wallet as a capability
    #[serde(default)]
    pub paymaster_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// EIP-1193 bridge endpoint; no bridge means no provider
    #[serde(default)]
    pub bridge_url: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_app_name() -> String {
    "Base Paymaster Demo".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            bridge_url: None,
            request_timeout_ms: default_request_timeout(),
            app_name: default_app_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between status queries in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    60
}

fn default_interval_ms() -> u64 {
    2000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollingConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(self.max_attempts, self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Treat a failing `wallet_getCapabilities` as "supported"
    #[serde(default = "default_true")]
    pub assume_supported_on_capability_error: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            assume_supported_on_capability_error: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Validated claim configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimTarget {
    pub contract_address: Address,
    pub paymaster_url: String,
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("polling.max_attempts", 60)?
            .set_default("polling.interval_ms", 2000)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GASLESS_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GASLESS__REWARDS__PAYMASTER_URL, etc.)
            .add_source(
                Environment::with_prefix("GASLESS")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Contract address and paymaster URL, or a configuration error naming what is missing
    pub fn claim_target(&self) -> Result<ClaimTarget> {
        let contract = non_empty(self.rewards.contract_address.as_deref());
        let paymaster = non_empty(self.rewards.paymaster_url.as_deref());

        let (contract, paymaster) = match (contract, paymaster) {
            (Some(c), Some(p)) => (c, p),
            (None, Some(_)) => {
                return Err(ClaimError::Configuration(
                    "rewards.contract_address".to_string(),
                ))
            }
            (Some(_), None) => {
                return Err(ClaimError::Configuration("rewards.paymaster_url".to_string()))
            }
            (None, None) => {
                return Err(ClaimError::Configuration(
                    "rewards.contract_address, rewards.paymaster_url".to_string(),
                ))
            }
        };

        let contract_address: Address = contract.parse().map_err(|e| {
            ClaimError::Configuration(format!("invalid rewards.contract_address: {e}"))
        })?;

        Ok(ClaimTarget {
            contract_address,
            paymaster_url: paymaster.to_string(),
        })
    }

    /// Parsed target-chain RPC endpoint
    pub fn rpc_url(&self) -> Result<Url> {
        Url::parse(self.chain.rpc_url.trim())
            .map_err(|e| ClaimError::Configuration(format!("invalid chain.rpc_url: {e}")))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            rewards: RewardsConfig::default(),
            wallet: WalletConfig::default(),
            polling: PollingConfig::default(),
            relay: RelayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
