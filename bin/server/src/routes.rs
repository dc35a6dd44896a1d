//! Request handlers.
//!
//! Handlers validate request shape, hand the work to the query service and
//! translate the outcome into a status code. Per-address failures inside a
//! balance result are still a 200.

use crate::{
    error::{ApiError, ErrorBody},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use balance::{BalanceResult, BatchBalances, Outcome, TokenInfoResult, TopHolder};
use client::{is_valid_address, Endpoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{num::IntErrorKind, time::Instant};

pub const SERVICE_NAME: &str = "Polygon Token API";

/// `n` when the caller leaves it out.
pub const DEFAULT_TOP_COUNT: i64 = 10;
pub const MAX_TOP_COUNT: i64 = 1000;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Endpoint not found")))
}

#[derive(Debug, Deserialize)]
pub struct BalanceParams {
    address: Option<String>,
}

pub async fn get_balance<E>(
    State(state): State<AppState<E>>,
    Query(params): Query<BalanceParams>,
) -> Result<Json<BalanceResult>, ApiError>
where
    E: Endpoint + 'static,
{
    const ROUTE: &str = "get_balance";
    state.metrics.record_request(ROUTE);

    let Some(address) = params.address.filter(|a| !a.is_empty()) else {
        state.metrics.record_rejected(ROUTE);
        return Err(ApiError::validation("Address parameter is required"));
    };

    if !is_valid_address(&address) {
        state.metrics.record_rejected(ROUTE);
        return Err(ApiError::validation("Invalid Ethereum address"));
    }

    let result = state.service.get_balance(&address).await;
    state.metrics.record_balance(&result);

    Ok(Json(result))
}

/// Batch body. `addresses` stays loosely typed so a wrong element type is
/// reported per entry instead of failing the whole body.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    addresses: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    pub batch: BatchBalances,
    pub success: bool,
}

pub async fn get_balance_batch<E>(
    State(state): State<AppState<E>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError>
where
    E: Endpoint + 'static,
{
    const ROUTE: &str = "get_balance_batch";
    state.metrics.record_request(ROUTE);

    let addresses = match batch_addresses(payload) {
        Ok(addresses) => addresses,
        Err(e) => {
            state.metrics.record_rejected(ROUTE);
            return Err(e);
        }
    };

    let started = Instant::now();
    let batch = state.service.get_balance_batch(&addresses).await?;
    state.metrics.record_batch(&batch.balances, started.elapsed());

    Ok(Json(BatchResponse {
        batch,
        success: true,
    }))
}

fn batch_addresses(
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Vec<String>, ApiError> {
    let required = || ApiError::validation("Addresses array is required");

    let items = match payload {
        Ok(Json(BatchRequest {
            addresses: Some(Value::Array(items)),
        })) if !items.is_empty() => items,
        _ => return Err(required()),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(address) if is_valid_address(&address) => Ok(address),
            Value::String(address) => Err(ApiError::Validation(format!(
                "Invalid Ethereum address: {address}"
            ))),
            other => Err(ApiError::Validation(format!(
                "Invalid Ethereum address: {other}"
            ))),
        })
        .collect()
}

pub async fn get_token_info<E>(
    State(state): State<AppState<E>>,
) -> Result<Json<TokenInfoResult>, ApiError>
where
    E: Endpoint + 'static,
{
    state.metrics.record_request("get_token_info");

    let result = state.service.get_token_info().await;
    state.metrics.record_token_info(&result);

    match &result.outcome {
        Outcome::Found(_) => Ok(Json(result)),
        Outcome::Failed(failure) => Err(ApiError::Upstream(failure.error.clone())),
    }
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    n: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopHoldersResponse {
    pub top_holders: Vec<TopHolder>,
    pub count: usize,
    pub requested_count: usize,
    pub success: bool,
}

impl TopHoldersResponse {
    fn new(top_holders: Vec<TopHolder>, requested_count: usize) -> Self {
        Self {
            count: top_holders.len(),
            top_holders,
            requested_count,
            success: true,
        }
    }
}

/// Parse the `n` query parameter. Integers too large for `i64` are out of
/// range, not malformed.
pub fn parse_top_count(raw: Option<&str>) -> Result<usize, ApiError> {
    let out_of_range = || {
        ApiError::Validation(format!(
            "Parameter n must be between 1 and {MAX_TOP_COUNT}"
        ))
    };

    let n = match raw {
        None => DEFAULT_TOP_COUNT,
        Some(raw) => raw.trim().parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(),
            _ => ApiError::validation("Parameter n must be integer"),
        })?,
    };

    if !(1..=MAX_TOP_COUNT).contains(&n) {
        return Err(out_of_range());
    }

    usize::try_from(n).map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn get_top<E>(
    State(state): State<AppState<E>>,
    Query(params): Query<TopParams>,
) -> Result<Json<TopHoldersResponse>, ApiError>
where
    E: Endpoint + 'static,
{
    const ROUTE: &str = "get_top";
    state.metrics.record_request(ROUTE);

    let n = parse_top_count(params.n.as_deref())
        .inspect_err(|_| state.metrics.record_rejected(ROUTE))?;
    let holders = state.service.get_top_holders(n);

    Ok(Json(TopHoldersResponse::new(holders, n)))
}

pub async fn get_top_with_transactions<E>(
    State(state): State<AppState<E>>,
    Query(params): Query<TopParams>,
) -> Result<Json<TopHoldersResponse>, ApiError>
where
    E: Endpoint + 'static,
{
    const ROUTE: &str = "get_top_with_transactions";
    state.metrics.record_request(ROUTE);

    let n = parse_top_count(params.n.as_deref())
        .inspect_err(|_| state.metrics.record_rejected(ROUTE))?;
    let holders = state.service.get_top_holders_with_transactions(n);

    Ok(Json(TopHoldersResponse::new(holders, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ApiError) -> String {
        err.to_string()
    }

    #[test]
    fn test_parse_top_count() {
        assert_eq!(parse_top_count(None).unwrap(), 10);
        assert_eq!(parse_top_count(Some("1")).unwrap(), 1);
        assert_eq!(parse_top_count(Some(" 25 ")).unwrap(), 25);
        assert_eq!(parse_top_count(Some("1000")).unwrap(), 1000);
    }

    #[test]
    fn test_parse_top_count_rejects() {
        for raw in ["abc", "", "1.5", "ten"] {
            assert_eq!(
                message(parse_top_count(Some(raw)).unwrap_err()),
                "Parameter n must be integer",
                "raw = {raw:?}"
            );
        }

        for raw in [
            "0",
            "-3",
            "1001",
            "99999999999999999999",
            "-99999999999999999999",
        ] {
            assert_eq!(
                message(parse_top_count(Some(raw)).unwrap_err()),
                "Parameter n must be between 1 and 1000",
                "raw = {raw:?}"
            );
        }
    }
}
