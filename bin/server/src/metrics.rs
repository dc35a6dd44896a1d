//! Prometheus metrics for the token API.
//!
//! All metrics are aggregated in the [`Metrics`] struct so handlers record
//! through one handle.

use balance::{BalanceResult, Outcome, TokenInfoResult};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for the token API.
///
/// Metric descriptions are registered with the global registry on creation.
/// Without an installed exporter every recording is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Requests
        describe_counter!(
            "token_api_requests_total",
            "Total number of API requests by route"
        );
        describe_counter!(
            "token_api_rejected_requests_total",
            "Total number of requests rejected by validation, by route"
        );

        // Balance lookups
        describe_counter!(
            "token_api_balance_lookups_total",
            "Total balance lookups by outcome code"
        );
        describe_histogram!(
            "token_api_batch_size",
            "Number of addresses per batch request"
        );
        describe_histogram!(
            "token_api_batch_duration_seconds",
            "Duration of each batch lookup in seconds"
        );

        // Token info
        describe_counter!(
            "token_api_token_info_total",
            "Total token info lookups by outcome code"
        );

        // Connection
        describe_gauge!(
            "token_api_rpc_connected",
            "1 while the API is bound to a live RPC endpoint"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Request metrics
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn record_request(&self, route: &'static str) {
        counter!("token_api_requests_total", "route" => route).increment(1);
    }

    pub fn record_rejected(&self, route: &'static str) {
        counter!("token_api_rejected_requests_total", "route" => route).increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lookup metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record the outcome of one balance lookup.
    pub fn record_balance(&self, result: &BalanceResult) {
        let outcome = result.failure().map_or("OK", |f| f.error_code.code());
        counter!("token_api_balance_lookups_total", "outcome" => outcome).increment(1);
    }

    /// Record a whole batch and each of its lookups.
    pub fn record_batch(&self, balances: &[BalanceResult], duration: Duration) {
        histogram!("token_api_batch_size").record(balances.len() as f64);
        histogram!("token_api_batch_duration_seconds").record(duration.as_secs_f64());

        for result in balances {
            self.record_balance(result);
        }
    }

    pub fn record_token_info(&self, result: &TokenInfoResult) {
        let outcome = match &result.outcome {
            Outcome::Found(_) => "OK",
            Outcome::Failed(failure) => failure.error_code.code(),
        };
        counter!("token_api_token_info_total", "outcome" => outcome).increment(1);
    }

    pub fn set_connected(&self, connected: bool) {
        gauge!("token_api_rpc_connected").set(if connected { 1.0 } else { 0.0 });
    }
}

/// Install the Prometheus metrics exporter and start its HTTP listener.
///
/// Returns an error if the listener fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
