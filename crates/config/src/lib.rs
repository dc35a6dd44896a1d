//! Configuration types for the token API.
//!
//! This crate provides:
//! - Network defaults (Polygon endpoints, served token)
//! - The single [`Config`] value built at process start
//! - Configuration loading and validation
//!
//! The configuration is read once by the binary and passed explicitly into
//! every component; nothing below the binary reads the environment.

pub mod network;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
pub use network::{PolygonConfig, POLYGON_RPC_URLS};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`Config`]
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Contract interface description could not be loaded
    #[error(transparent)]
    Abi(#[from] binding::AbiError),

    /// A value failed validation
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote node settings
    pub rpc: RpcConfig,

    /// Served token contract
    pub contract: ContractConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub log: LogConfig,
}

/// Remote node settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Endpoint urls, probed in order at startup
    pub urls: Vec<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Endpoints reporting another chain id are skipped
    pub chain_id: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            urls: PolygonConfig::rpc_urls(),
            request_timeout_secs: 10,
            chain_id: PolygonConfig::mainnet().chain_id,
        }
    }
}

/// Token contract settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Token contract address. Mixed-case input must be EIP-55 checksummed.
    #[serde(deserialize_with = "checksummed_address")]
    pub address: Address,

    /// JSON ABI artifact; the embedded ERC20 ABI is used when unset
    pub abi_path: Option<PathBuf>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: PolygonConfig::mainnet().token,
            abi_path: None,
        }
    }
}

impl ContractConfig {
    /// Load the contract interface description.
    pub fn load_abi(&self) -> Result<JsonAbi, ConfigError> {
        let abi = match &self.abi_path {
            Some(path) => binding::load_abi(path)?,
            None => binding::erc20_abi()?,
        };

        Ok(abi)
    }
}

fn checksummed_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let digits = raw.strip_prefix("0x").unwrap_or(&raw);

    let address: Address = digits
        .parse()
        .map_err(|e| de::Error::custom(format!("invalid address `{raw}`: {e}")))?;

    let mixed_case = digits.bytes().any(|b| b.is_ascii_lowercase())
        && digits.bytes().any(|b| b.is_ascii_uppercase());
    if mixed_case && address.to_checksum(None)[2..] != *digits {
        return Err(de::Error::custom(format!(
            "address `{raw}` has an invalid EIP-55 checksum"
        )));
    }

    Ok(address)
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Maximum number of balance lookups in flight for one batch request
    pub batch_concurrency: usize,

    /// Port for the Prometheus exporter; disabled when unset
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            batch_concurrency: 8,
            metrics_port: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Check the values the rest of the system relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.urls.iter().all(|url| url.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "rpc.urls",
                reason: "at least one endpoint is required".to_string(),
            });
        }

        if self.rpc.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "rpc.request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.server.batch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "server.batch_concurrency",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Endpoint urls with surrounding whitespace and blanks removed.
    pub fn rpc_urls(&self) -> Vec<String> {
        self.rpc
            .urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
