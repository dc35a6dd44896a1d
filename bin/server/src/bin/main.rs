use balance::TokenQueryService;
use clap::Parser;
use client::{ChainConnector, ContractBinding};
use config::LogConfig;
use server::{
    build_router,
    cli::Cli,
    metrics::{install_prometheus_exporter, Metrics},
    AppState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    init_tracing(&config.log);

    info!("Starting Polygon Token API");
    info!("Loaded config:");
    info!("  RPC endpoints: {}", config.rpc_urls().len());
    info!("  Chain id: {}", config.rpc.chain_id);
    info!("  Token: {}", config.contract.address);
    info!("  Request timeout: {:?}", config.request_timeout());

    let metrics = Metrics::new();
    if let Some(port) = config.server.metrics_port {
        install_prometheus_exporter(port)?;
        info!("Prometheus metrics on port {}", port);
    }

    let contract = ContractBinding::new(config.contract.address, config.contract.load_abi()?)
        .with_chain_id(config.rpc.chain_id);

    let connector =
        match ChainConnector::from_urls(&config.rpc_urls(), contract, config.request_timeout())
            .await
        {
            Ok(connector) => connector,
            Err(e) => {
                error!("{}", e);
                metrics.set_connected(false);
                return Err(e.into());
            }
        };
    metrics.set_connected(true);

    let service = TokenQueryService::new(Arc::new(connector))
        .with_batch_concurrency(config.server.batch_concurrency);
    let app = build_router(AppState::new(service, metrics));

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
