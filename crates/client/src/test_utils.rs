//! In-memory endpoint double for tests.
//!
//! [`FakeNode`] answers the ERC20 read surface from local state and counts
//! every probe and call it receives.

use crate::{CallError, ContractBinding, Endpoint};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use binding::token::IERC20;
use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

/// Fake ERC20 node.
#[derive(Debug)]
pub struct FakeNode {
    url: String,
    chain_id: u64,
    reachable: bool,
    failing_calls: bool,
    probe_delay: Option<Duration>,
    call_delay: Option<Duration>,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    reverting: HashSet<Address>,
    probes: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeNode {
    pub const CONTRACT: Address = address!("1a9b54a3075119f1546c52ca0940551a6ce5d2d0");
    pub const SYMBOL: &'static str = "TBY";
    pub const NAME: &'static str = "TestToken";
    pub const CHAIN_ID: u64 = 137;

    /// A reachable node holding no balances, 18 decimals, 1000 tokens supply.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            chain_id: Self::CHAIN_ID,
            reachable: true,
            failing_calls: false,
            probe_delay: None,
            call_delay: None,
            decimals: 18,
            total_supply: U256::from(1_000u64) * U256::from(10u64).pow(U256::from(18u64)),
            balances: HashMap::new(),
            reverting: HashSet::new(),
            probes: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// A node that fails every probe and every call.
    pub fn unreachable(url: &str) -> Self {
        Self {
            reachable: false,
            failing_calls: true,
            ..Self::new(url)
        }
    }

    /// Binding for [`Self::CONTRACT`] with the embedded ERC20 ABI.
    pub fn contract_binding() -> ContractBinding {
        ContractBinding::new(
            Self::CONTRACT,
            binding::erc20_abi().expect("embedded ERC20 ABI parses"),
        )
    }

    /// Report `chain_id` from the liveness probe instead of [`Self::CHAIN_ID`].
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_balance(mut self, holder: Address, amount: U256) -> Self {
        self.balances.insert(holder, amount);
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_total_supply(mut self, total_supply: U256) -> Self {
        self.total_supply = total_supply;
        self
    }

    /// `balanceOf(holder)` reverts.
    pub fn with_revert_for(mut self, holder: Address) -> Self {
        self.reverting.insert(holder);
        self
    }

    /// Probes succeed but every call fails at the transport level.
    pub fn with_failing_calls(mut self) -> Self {
        self.failing_calls = true;
        self
    }

    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = Some(delay);
        self
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, input: &[u8]) -> Result<DynSolValue, CallError> {
        let selector = input
            .get(..4)
            .ok_or_else(|| CallError::transport("calldata shorter than a selector"))?;

        if selector == IERC20::decimalsCall::SELECTOR {
            Ok(DynSolValue::Uint(U256::from(self.decimals), 8))
        } else if selector == IERC20::symbolCall::SELECTOR {
            Ok(DynSolValue::String(Self::SYMBOL.to_string()))
        } else if selector == IERC20::nameCall::SELECTOR {
            Ok(DynSolValue::String(Self::NAME.to_string()))
        } else if selector == IERC20::totalSupplyCall::SELECTOR {
            Ok(DynSolValue::Uint(self.total_supply, 256))
        } else if selector == IERC20::balanceOfCall::SELECTOR {
            let holder = input
                .get(16..36)
                .map(Address::from_slice)
                .ok_or_else(|| CallError::transport("balanceOf calldata too short"))?;

            if self.reverting.contains(&holder) {
                return Err(CallError::ContractRejected {
                    reason: "execution reverted: holder is blocked".to_string(),
                });
            }

            let amount = self.balances.get(&holder).copied().unwrap_or(U256::ZERO);
            Ok(DynSolValue::Uint(amount, 256))
        } else {
            Err(CallError::transport("the method does not exist"))
        }
    }
}

impl Endpoint for FakeNode {
    fn url(&self) -> &str {
        &self.url
    }

    async fn probe(&self) -> Result<u64, CallError> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }

        if self.reachable {
            Ok(self.chain_id)
        } else {
            Err(CallError::transport("connection refused"))
        }
    }

    async fn eth_call(&self, _to: Address, input: Bytes) -> Result<Bytes, CallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.call_delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_calls {
            return Err(CallError::transport("connection reset by peer"));
        }

        let value = self.answer(&input)?;
        Ok(DynSolValue::Tuple(vec![value]).abi_encode_params().into())
    }
}
