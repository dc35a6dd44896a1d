use crate::{
    endpoint::{Endpoint, RpcEndpoint},
    CallError, ConnectError,
};
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, U256};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Contract address plus the interface description used to encode calls.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    abi: JsonAbi,
    chain_id: Option<u64>,
}

impl ContractBinding {
    pub const fn new(address: Address, abi: JsonAbi) -> Self {
        Self {
            address,
            abi,
            chain_id: None,
        }
    }

    /// Only accept endpoints that report `chain_id`.
    pub const fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 form of the contract address.
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }

    fn accepts_chain(&self, chain_id: u64) -> bool {
        self.chain_id.is_none_or(|expected| expected == chain_id)
    }

    /// Resolve `name` among the interface's functions, picking the overload
    /// that takes `arity` positional arguments.
    fn function(&self, name: &str, arity: usize) -> Result<&Function, CallError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .ok_or_else(|| {
                CallError::transport(format!(
                    "function `{name}` with {arity} argument(s) is not part of the contract interface"
                ))
            })
    }
}

/// Token metadata as read from the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub symbol: String,
    pub name: String,
    pub total_supply: U256,
    pub decimals: u8,
    pub address: Address,
}

/// Connection to one live endpoint, bound to one contract.
///
/// The active endpoint is chosen once, at construction, and never changes.
/// Nothing is mutated after construction, so a connector can be shared
/// across tasks behind an `Arc`.
#[derive(Debug)]
pub struct ChainConnector<E> {
    endpoint: E,
    contract: ContractBinding,
    timeout: Duration,
}

impl ChainConnector<RpcEndpoint> {
    /// Build HTTP endpoints from `urls` and connect to the first live one.
    ///
    /// Urls that fail to parse count as failed attempts.
    pub async fn from_urls(
        urls: &[String],
        contract: ContractBinding,
        timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let candidates = urls.iter().filter_map(|url| match RpcEndpoint::new(url) {
            Ok(endpoint) => Some(endpoint),
            Err(e) => {
                warn!(url = %url, error = %e, "Skipping RPC endpoint");
                None
            }
        });

        Self::connect(candidates, contract, timeout)
            .await
            .map_err(|_| ConnectError::BlockchainUnavailable {
                attempted: urls.to_vec(),
            })
    }
}

impl<E> ChainConnector<E>
where
    E: Endpoint,
{
    /// Probe `candidates` in order and keep the first that answers within
    /// `timeout` on the contract's chain. Later candidates are never
    /// contacted.
    pub async fn connect<I>(
        candidates: I,
        contract: ContractBinding,
        timeout: Duration,
    ) -> Result<Self, ConnectError>
    where
        I: IntoIterator<Item = E>,
    {
        let mut attempted = Vec::new();

        for endpoint in candidates {
            let probe = tokio::time::timeout(timeout, endpoint.probe()).await;

            match probe {
                Ok(Ok(chain_id)) if !contract.accepts_chain(chain_id) => {
                    warn!(
                        url = endpoint.url(),
                        chain_id,
                        expected = ?contract.chain_id,
                        "RPC endpoint is on another chain"
                    );
                }
                Ok(Ok(chain_id)) => {
                    info!(
                        url = endpoint.url(),
                        chain_id,
                        contract = %contract.checksum_address(),
                        "Connected to RPC"
                    );
                    return Ok(Self {
                        endpoint,
                        contract,
                        timeout,
                    });
                }
                Ok(Err(e)) => {
                    warn!(url = endpoint.url(), error = %e, "RPC endpoint failed liveness probe");
                }
                Err(_) => {
                    warn!(url = endpoint.url(), ?timeout, "RPC endpoint probe timed out");
                }
            }

            attempted.push(endpoint.url().to_string());
        }

        Err(ConnectError::BlockchainUnavailable { attempted })
    }

    /// Url of the endpoint every call is routed through.
    pub fn active_url(&self) -> &str {
        self.endpoint.url()
    }

    /// Call a read-only contract function by name with positional arguments.
    ///
    /// No retry is attempted; a failed call is reported as is.
    pub async fn call(
        &self,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, CallError> {
        let func = self.contract.function(function, args.len())?;
        let input = func.abi_encode_input(args).map_err(|e| {
            CallError::transport(format!("failed to encode `{function}` arguments: {e}"))
        })?;

        debug!(function, url = self.endpoint.url(), "Calling contract");

        let response = tokio::time::timeout(
            self.timeout,
            self.endpoint.eth_call(self.contract.address(), input.into()),
        )
        .await;

        let output = match response {
            Ok(result) => result?,
            Err(_) => {
                return Err(CallError::transport(format!(
                    "`{function}` timed out after {:?}",
                    self.timeout
                )))
            }
        };

        func.abi_decode_output(&output)
            .map_err(|e| CallError::transport(format!("malformed `{function}` response: {e}")))
    }

    pub async fn decimals(&self) -> Result<u8, CallError> {
        let output = self.call("decimals", &[]).await?;
        let value = single_uint(&output, "decimals")?;

        if value > U256::from(u8::MAX) {
            return Err(CallError::transport(format!(
                "decimals value {value} does not fit in uint8"
            )));
        }

        Ok(value.as_limbs()[0] as u8)
    }

    /// Raw balance of `holder` in the token's smallest unit.
    pub async fn balance_of(&self, holder: Address) -> Result<U256, CallError> {
        let output = self
            .call("balanceOf", &[DynSolValue::Address(holder)])
            .await?;

        single_uint(&output, "balanceOf")
    }

    pub async fn total_supply(&self) -> Result<U256, CallError> {
        let output = self.call("totalSupply", &[]).await?;
        single_uint(&output, "totalSupply")
    }

    pub async fn symbol(&self) -> Result<String, CallError> {
        let output = self.call("symbol", &[]).await?;
        single_string(output, "symbol")
    }

    pub async fn name(&self) -> Result<String, CallError> {
        let output = self.call("name", &[]).await?;
        single_string(output, "name")
    }

    /// Read symbol, name, total supply and decimals. Fails as a whole if any
    /// of the reads fails.
    pub async fn token_info(&self) -> Result<TokenMetadata, CallError> {
        let (symbol, name, total_supply, decimals) = tokio::try_join!(
            self.symbol(),
            self.name(),
            self.total_supply(),
            self.decimals()
        )?;

        Ok(TokenMetadata {
            symbol,
            name,
            total_supply,
            decimals,
            address: self.contract.address(),
        })
    }
}

fn single_uint(output: &[DynSolValue], function: &str) -> Result<U256, CallError> {
    match output.first().and_then(DynSolValue::as_uint) {
        Some((value, _)) => Ok(value),
        None => Err(CallError::transport(format!(
            "`{function}` did not return an unsigned integer"
        ))),
    }
}

fn single_string(output: Vec<DynSolValue>, function: &str) -> Result<String, CallError> {
    match output.into_iter().next() {
        Some(DynSolValue::String(value)) => Ok(value),
        _ => Err(CallError::transport(format!(
            "`{function}` did not return a string"
        ))),
    }
}
