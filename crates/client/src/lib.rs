//! Chain connector for read-only token contract calls.
//!
//! The connector probes an ordered list of RPC endpoints once, keeps the
//! first one that answers, and routes every contract call through it.
//! Failures are classified into a small taxonomy ([`CallError`]) so callers
//! can tell a contract revert apart from a dead node.

pub mod address;
pub mod connector;
pub mod endpoint;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use address::{is_valid_address, normalize_address};
pub use connector::{ChainConnector, ContractBinding, TokenMetadata};
pub use endpoint::{Endpoint, RpcEndpoint};

use serde::Serialize;
use thiserror::Error;

/// Failure of a single contract read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Input is not a syntactically valid address; no request was sent
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The node executed the call and the contract reverted it
    #[error("Contract rejected call: {reason}")]
    ContractRejected { reason: String },

    /// Network error, timeout, or a response that does not match the interface
    #[error("RPC transport failed: {reason}")]
    TransportFailed { reason: String },
}

impl CallError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::TransportFailed {
            reason: reason.into(),
        }
    }

    pub const fn kind(&self) -> CallErrorKind {
        match self {
            Self::InvalidAddress(_) => CallErrorKind::InvalidAddress,
            Self::ContractRejected { .. } => CallErrorKind::ContractRejected,
            Self::TransportFailed { .. } => CallErrorKind::TransportFailed,
        }
    }
}

/// Stable classification of a [`CallError`], safe to expose to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallErrorKind {
    InvalidAddress,
    ContractRejected,
    TransportFailed,
}

impl CallErrorKind {
    /// Machine-readable code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::ContractRejected => "CONTRACT_REJECTED",
            Self::TransportFailed => "TRANSPORT_FAILED",
        }
    }

    /// Message returned to API clients; details stay in the logs.
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::InvalidAddress => "Invalid address",
            Self::ContractRejected => "Smart contract error",
            Self::TransportFailed => "RPC call failed",
        }
    }
}

/// Failure to build a connector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Endpoint url could not be parsed
    #[error("Invalid RPC URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No endpoint passed the liveness probe
    #[error("Unable to connect to any RPC endpoint (attempted: [{}])", .attempted.join(", "))]
    BlockchainUnavailable { attempted: Vec<String> },
}
