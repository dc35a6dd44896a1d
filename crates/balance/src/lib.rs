//! Token queries on top of the chain connector.
//!
//! This crate turns domain requests (balance of an address, a batch of
//! addresses, token metadata, top holders) into connector calls and shapes
//! the answers into result records. Expected failures are part of the
//! records, never errors, so a batch keeps going when one address fails.

pub mod holders;
pub mod service;

pub use holders::TopHolder;
pub use service::TokenQueryService;

use alloy_primitives::U256;
use client::{CallError, CallErrorKind, TokenMetadata};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Request input is malformed as a whole
    #[error("{0}")]
    Validation(String),
}

/// Either the queried value or why it could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Found(T),
    Failed(Failure),
}

/// Public description of a failed read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub error: String,
    pub error_code: CallErrorKind,
}

impl From<&CallError> for Failure {
    fn from(err: &CallError) -> Self {
        let kind = err.kind();
        Self {
            error: kind.public_message().to_string(),
            error_code: kind,
        }
    }
}

/// Balance of one address in raw and display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAmount {
    /// Raw balance in the smallest unit, as a decimal string
    pub balance_wei: String,
    /// Raw balance divided by 10^decimals; display only
    pub balance_formatted: f64,
}

/// Result of a balance lookup for one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceResult {
    /// Address exactly as supplied by the caller
    pub address: String,
    pub success: bool,
    #[serde(flatten)]
    pub outcome: Outcome<BalanceAmount>,
}

impl BalanceResult {
    pub fn found(address: impl Into<String>, amount: BalanceAmount) -> Self {
        Self {
            address: address.into(),
            success: true,
            outcome: Outcome::Found(amount),
        }
    }

    pub fn failed(address: impl Into<String>, err: &CallError) -> Self {
        Self {
            address: address.into(),
            success: false,
            outcome: Outcome::Failed(err.into()),
        }
    }

    pub const fn amount(&self) -> Option<&BalanceAmount> {
        match &self.outcome {
            Outcome::Found(amount) => Some(amount),
            Outcome::Failed(_) => None,
        }
    }

    pub const fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            Outcome::Found(_) => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }
}

/// Ordered per-address results of a batch lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchBalances {
    pub balances: Vec<BalanceResult>,
    pub count: usize,
}

/// Token metadata in API form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "totalSupply")]
    pub total_supply: String,
    #[serde(rename = "totalSupply_formatted")]
    pub total_supply_formatted: f64,
    pub decimals: u8,
    /// Checksummed contract address
    pub address: String,
}

impl TokenInfo {
    pub fn from_metadata(metadata: TokenMetadata) -> Result<Self, CallError> {
        let total_supply_formatted = format_amount(metadata.total_supply, metadata.decimals)?;

        Ok(Self {
            symbol: metadata.symbol,
            name: metadata.name,
            total_supply: metadata.total_supply.to_string(),
            total_supply_formatted,
            decimals: metadata.decimals,
            address: metadata.address.to_checksum(None),
        })
    }
}

/// Result of a token metadata lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInfoResult {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: Outcome<TokenInfo>,
}

impl TokenInfoResult {
    pub const fn found(info: TokenInfo) -> Self {
        Self {
            success: true,
            outcome: Outcome::Found(info),
        }
    }

    pub fn failed(err: &CallError) -> Self {
        Self {
            success: false,
            outcome: Outcome::Failed(err.into()),
        }
    }

    pub const fn info(&self) -> Option<&TokenInfo> {
        match &self.outcome {
            Outcome::Found(info) => Some(info),
            Outcome::Failed(_) => None,
        }
    }
}

/// Divide `raw` by 10^`decimals` for display.
///
/// Precision loss is accepted; the raw value is kept separately.
pub fn format_amount(raw: U256, decimals: u8) -> Result<f64, CallError> {
    let divisor = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| CallError::transport(format!("decimals {decimals} out of range")))?;

    let whole = raw / divisor;
    let fraction = (raw % divisor).to_string();

    let text = if decimals == 0 {
        whole.to_string()
    } else {
        format!("{whole}.{fraction:0>width$}", width = decimals as usize)
    };

    text.parse::<f64>()
        .map_err(|e| CallError::transport(format!("unformattable amount {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        let raw = U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(format_amount(raw, 18).unwrap(), 100.0);
        assert_eq!(format_amount(U256::from(1_500_000u64), 6).unwrap(), 1.5);
        assert_eq!(format_amount(U256::from(1u64), 6).unwrap(), 0.000001);
        assert_eq!(format_amount(U256::from(42u64), 0).unwrap(), 42.0);
        assert_eq!(format_amount(U256::ZERO, 18).unwrap(), 0.0);
    }

    #[test]
    fn test_format_amount_huge_values() {
        let formatted = format_amount(U256::MAX, 18).unwrap();
        assert!(formatted > 1e58);
    }

    #[test]
    fn test_format_amount_rejects_absurd_decimals() {
        let err = format_amount(U256::from(1u64), 200).unwrap_err();
        assert_eq!(err.kind(), CallErrorKind::TransportFailed);
    }

    #[test]
    fn test_balance_result_json_shapes() {
        let found = BalanceResult::found(
            "0x0000000000000000000000000000000000000001",
            BalanceAmount {
                balance_wei: "100000000000000000000".to_string(),
                balance_formatted: 100.0,
            },
        );
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            serde_json::json!({
                "address": "0x0000000000000000000000000000000000000001",
                "success": true,
                "balance_wei": "100000000000000000000",
                "balance_formatted": 100.0,
            })
        );

        let failed = BalanceResult::failed(
            "0xbad",
            &CallError::InvalidAddress("0xbad".to_string()),
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({
                "address": "0xbad",
                "success": false,
                "error": "Invalid address",
                "error_code": "INVALID_ADDRESS",
            })
        );
    }

    #[test]
    fn test_token_info_json_uses_camel_case_supply() {
        let info = TokenInfoResult::found(TokenInfo {
            symbol: "TBY".to_string(),
            name: "TestToken".to_string(),
            total_supply: "1000000000000000000000".to_string(),
            total_supply_formatted: 1000.0,
            decimals: 18,
            address: "0x1A9b54A3075119f1546C52cA0940551A6ce5d2D0".to_string(),
        });
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["totalSupply"], "1000000000000000000000");
        assert_eq!(json["totalSupply_formatted"], 1000.0);
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }
}
