use crate::{
    holders, BalanceAmount, BalanceResult, BatchBalances, ServiceError, TokenInfo,
    TokenInfoResult, TopHolder,
};
use chrono::Utc;
use client::{normalize_address, CallError, ChainConnector, Endpoint};
use futures::{stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of balance lookups in flight per batch.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// Query façade over a shared [`ChainConnector`].
pub struct TokenQueryService<E> {
    connector: Arc<ChainConnector<E>>,
    batch_concurrency: usize,
}

impl<E> TokenQueryService<E>
where
    E: Endpoint,
{
    pub const fn new(connector: Arc<ChainConnector<E>>) -> Self {
        Self {
            connector,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Bound the fan-out of batch lookups. Zero is treated as one.
    pub fn with_batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = limit.max(1);
        self
    }

    /// Balance of `address`. Every expected failure is captured in the result.
    pub async fn get_balance(&self, address: &str) -> BalanceResult {
        match self.lookup_balance(address).await {
            Ok(amount) => BalanceResult::found(address, amount),
            Err(e) => {
                warn!(address, error = %e, "Balance lookup failed");
                BalanceResult::failed(address, &e)
            }
        }
    }

    async fn lookup_balance(&self, address: &str) -> Result<BalanceAmount, CallError> {
        let holder = normalize_address(address)?;
        let raw = self.connector.balance_of(holder).await?;
        let decimals = self.connector.decimals().await?;
        let balance_formatted = crate::format_amount(raw, decimals)?;

        debug!(%holder, %raw, decimals, "Balance read");

        Ok(BalanceAmount {
            balance_wei: raw.to_string(),
            balance_formatted,
        })
    }

    /// Balances of `addresses`, in input order. One address failing never
    /// affects the others.
    pub async fn get_balance_batch(
        &self,
        addresses: &[String],
    ) -> Result<BatchBalances, ServiceError> {
        if addresses.is_empty() {
            return Err(ServiceError::Validation(
                "addresses must be a non-empty list".to_string(),
            ));
        }

        let lookups: Vec<_> = addresses
            .iter()
            .map(|address| self.get_balance(address))
            .collect();
        let balances: Vec<BalanceResult> = stream::iter(lookups)
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        Ok(BatchBalances {
            count: balances.len(),
            balances,
        })
    }

    pub async fn get_token_info(&self) -> TokenInfoResult {
        let info = match self.connector.token_info().await {
            Ok(metadata) => TokenInfo::from_metadata(metadata),
            Err(e) => Err(e),
        };

        match info {
            Ok(info) => TokenInfoResult::found(info),
            Err(e) => {
                warn!(error = %e, "Token info lookup failed");
                TokenInfoResult::failed(&e)
            }
        }
    }

    pub fn get_top_holders(&self, n: usize) -> Vec<TopHolder> {
        holders::top_holders(n)
    }

    pub fn get_top_holders_with_transactions(&self, n: usize) -> Vec<TopHolder> {
        holders::top_holders_with_transactions(n, Utc::now())
    }
}
