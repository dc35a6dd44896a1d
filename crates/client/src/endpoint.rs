//! Remote node access.
//!
//! [`Endpoint`] is the seam between the connector and the network: a
//! liveness probe plus a raw `eth_call`. [`RpcEndpoint`] implements it over
//! an alloy HTTP provider.

use crate::{CallError, ConnectError};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_transport::{RpcError, TransportError};
use std::{future::Future, sync::Arc};

/// JSON-RPC error code geth and most clients use for `execution reverted`.
const REVERT_ERROR_CODE: i64 = 3;

/// A remote node speaking the Ethereum JSON-RPC protocol.
pub trait Endpoint: Send + Sync {
    /// Url the endpoint was built from.
    fn url(&self) -> &str;

    /// Cheap round-trip confirming the node is reachable and speaks the
    /// protocol. Returns the node's chain id.
    fn probe(&self) -> impl Future<Output = Result<u64, CallError>> + Send;

    /// Execute a read-only call against `to` with ABI-encoded `input`.
    fn eth_call(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, CallError>> + Send;
}

impl<E: Endpoint> Endpoint for Arc<E> {
    fn url(&self) -> &str {
        (**self).url()
    }

    fn probe(&self) -> impl Future<Output = Result<u64, CallError>> + Send {
        (**self).probe()
    }

    fn eth_call(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, CallError>> + Send {
        (**self).eth_call(to, input)
    }
}

/// HTTP JSON-RPC endpoint backed by an alloy provider.
#[derive(Clone)]
pub struct RpcEndpoint {
    url: String,
    provider: DynProvider,
}

impl std::fmt::Debug for RpcEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcEndpoint").field("url", &self.url).finish()
    }
}

impl RpcEndpoint {
    /// Build an endpoint from a url. No request is sent until the first probe.
    pub fn new(rpc_url: &str) -> Result<Self, ConnectError> {
        let url: reqwest::Url = rpc_url.parse().map_err(|e| ConnectError::InvalidUrl {
            url: rpc_url.to_string(),
            reason: format!("{}", e),
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            url: rpc_url.to_string(),
            provider,
        })
    }
}

impl Endpoint for RpcEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn probe(&self) -> Result<u64, CallError> {
        self.provider.get_chain_id().await.map_err(classify)
    }

    async fn eth_call(&self, to: Address, input: Bytes) -> Result<Bytes, CallError> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::new(input));

        self.provider.call(tx).await.map_err(classify)
    }
}

/// Map a transport-level error onto the call taxonomy.
fn classify(err: TransportError) -> CallError {
    match &err {
        RpcError::ErrorResp(payload) if is_revert(payload.code, &payload.message) => {
            CallError::ContractRejected {
                reason: payload.message.to_string(),
            }
        }
        _ => CallError::transport(err.to_string()),
    }
}

/// Whether a JSON-RPC error response denotes a revert of the executed call.
pub(crate) fn is_revert(code: i64, message: &str) -> bool {
    code == REVERT_ERROR_CODE || message.to_ascii_lowercase().contains("revert")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let result = RpcEndpoint::new("not a url");
        assert!(matches!(result, Err(ConnectError::InvalidUrl { .. })));
    }

    #[test]
    fn test_valid_url_keeps_original_string() {
        let endpoint = RpcEndpoint::new("http://127.0.0.1:8545").unwrap();
        assert_eq!(endpoint.url(), "http://127.0.0.1:8545");
    }

    #[test]
    fn test_revert_detection() {
        assert!(is_revert(3, "execution reverted: ERC20: paused"));
        assert!(is_revert(-32000, "execution reverted"));
        assert!(is_revert(-32015, "VM Exception while processing transaction: revert"));
        assert!(!is_revert(-32601, "the method eth_call does not exist"));
        assert!(!is_revert(-32005, "rate limit exceeded"));
    }
}
