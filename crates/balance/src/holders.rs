//! Top holders listing.
//!
//! There is no holder index behind this: the listing is a fixed sample.
//! Ranking real holders needs an external indexer (Transfer event scanner or
//! a third-party ranking source), which this service does not have.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Format of `last_transaction_date`, always UTC.
pub const TRANSACTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SAMPLE_HOLDERS: [(&str, f64); 3] = [
    ("0x51f1774249Fc2B0C2603542Ac6184Ae1d048351d", 1500.0),
    ("0x4830AF4aB9cd9E381602aE50f71AE481a7727f7C", 1200.0),
    ("0x742E6fB6c6B75C6e0f7943c661a4eB9C90d3eAe1", 800.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopHolder {
    pub address: String,
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transaction_date: Option<String>,
}

/// Number of holders the sample can provide.
pub const fn sample_size() -> usize {
    SAMPLE_HOLDERS.len()
}

/// Up to `n` holders, largest balance first.
pub fn top_holders(n: usize) -> Vec<TopHolder> {
    SAMPLE_HOLDERS
        .iter()
        .take(n)
        .map(|(address, balance)| TopHolder {
            address: address.to_string(),
            balance: *balance,
            last_transaction_date: None,
        })
        .collect()
}

/// Up to `n` holders with a synthetic last transaction date: rank `i` is
/// dated `i + 1` days before `now`.
pub fn top_holders_with_transactions(n: usize, now: DateTime<Utc>) -> Vec<TopHolder> {
    top_holders(n)
        .into_iter()
        .zip(1i64..)
        .map(|(holder, days_ago)| {
            let date = now - TimeDelta::days(days_ago);
            TopHolder {
                last_transaction_date: Some(date.format(TRANSACTION_DATE_FORMAT).to_string()),
                ..holder
            }
        })
        .collect()
}
