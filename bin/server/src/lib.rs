//! HTTP surface of the token API.

pub mod cli;
pub mod error;
pub mod metrics;
pub mod routes;

use axum::{routing::get, routing::post, Router};
use balance::TokenQueryService;
use client::Endpoint;
use crate::metrics::Metrics;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
pub struct AppState<E> {
    pub service: Arc<TokenQueryService<E>>,
    pub metrics: Metrics,
}

impl<E> AppState<E> {
    pub fn new(service: TokenQueryService<E>, metrics: Metrics) -> Self {
        Self {
            service: Arc::new(service),
            metrics,
        }
    }
}

// Derive would require `E: Clone`.
impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            metrics: self.metrics.clone(),
        }
    }
}

/// Build the API router with CORS, request tracing and panic recovery.
pub fn build_router<E>(state: AppState<E>) -> Router
where
    E: Endpoint + 'static,
{
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/get_balance", get(routes::get_balance::<E>))
        .route("/api/get_balance_batch", post(routes::get_balance_batch::<E>))
        .route("/api/get_token_info", get(routes::get_token_info::<E>))
        .route("/api/get_top", get(routes::get_top::<E>))
        .route(
            "/api/get_top_with_transactions",
            get(routes::get_top_with_transactions::<E>),
        )
        .fallback(routes::not_found)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
