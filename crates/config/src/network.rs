//! Network defaults for the served token.
//!
//! Provides the RPC endpoints and token address used when no configuration
//! file or override supplies them.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Public Polygon PoS RPC endpoints, probed in this order.
pub const POLYGON_RPC_URLS: [&str; 3] = [
    "https://rpc.ankr.com/polygon",
    "https://polygon-rpc.com",
    "https://1rpc.io/matic",
];

/// Polygon network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonConfig {
    /// Chain ID
    pub chain_id: u64,
    /// Token contract served by the API
    pub token: Address,
}

impl PolygonConfig {
    /// Polygon PoS mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 137,
            token: address!("0x1a9b54a3075119f1546c52ca0940551a6ce5d2d0"),
        }
    }

    /// Default endpoint list as owned strings.
    pub fn rpc_urls() -> Vec<String> {
        POLYGON_RPC_URLS.iter().map(|url| url.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = PolygonConfig::mainnet();
        assert_eq!(config.chain_id, 137);
        assert_eq!(
            config.token,
            address!("1a9b54a3075119f1546c52ca0940551a6ce5d2d0")
        );
    }

    #[test]
    fn test_rpc_urls_keep_order() {
        let urls = PolygonConfig::rpc_urls();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0], "https://rpc.ankr.com/polygon");
        assert_eq!(urls[2], "https://1rpc.io/matic");
    }
}
