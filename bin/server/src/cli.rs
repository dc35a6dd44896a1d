//! Command line and environment overrides for the config file.

use clap::Parser;
use config::Config;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "token-api")]
#[command(about = "HTTP API for ERC-20 token queries on Polygon")]
pub struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long, env = "TOKEN_API_CONFIG")]
    pub config: Option<PathBuf>,

    /// RPC endpoints in failover order, comma separated
    #[arg(long, env = "POLYGON_RPC_URLS", value_delimiter = ',')]
    pub rpc_urls: Option<Vec<String>>,

    /// Token contract address
    #[arg(long, env = "TOKEN_ADDRESS")]
    pub token_address: Option<String>,

    /// Contract ABI JSON; the bundled ERC-20 ABI when omitted
    #[arg(long, env = "TOKEN_ABI_PATH")]
    pub abi: Option<PathBuf>,

    #[arg(long, env = "API_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "API_PORT")]
    pub port: Option<u16>,

    /// Per-call RPC timeout in seconds
    #[arg(long, env = "WEB3_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Chain id endpoints must report
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<u64>,

    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

impl Cli {
    /// Load the config file (or defaults), apply overrides and validate.
    pub fn load_config(&self) -> eyre::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        self.apply(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Overwrite config values with whatever was given on the command line
    /// or in the environment.
    pub fn apply(&self, config: &mut Config) -> eyre::Result<()> {
        if let Some(urls) = &self.rpc_urls {
            config.rpc.urls.clone_from(urls);
        }
        if let Some(address) = &self.token_address {
            config.contract.address = client::normalize_address(address)
                .map_err(|e| eyre::eyre!("Invalid token address: {e}"))?;
        }
        if let Some(abi) = &self.abi {
            config.contract.abi_path = Some(abi.clone());
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(timeout) = self.request_timeout {
            config.rpc.request_timeout_secs = timeout;
        }
        if let Some(chain_id) = self.chain_id {
            config.rpc.chain_id = chain_id;
        }
        if let Some(level) = &self.log_level {
            config.log.level.clone_from(level);
        }
        if self.log_json {
            config.log.json = true;
        }
        if self.metrics_port.is_some() {
            config.server.metrics_port = self.metrics_port;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("token-api").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let mut config = Config::default();
        Cli::default().apply(&mut config).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.rpc.urls, Config::default().rpc.urls);
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&[
            "--rpc-urls",
            "http://a, http://b",
            "--token-address",
            "0x0000000000000000000000000000000000000001",
            "--port",
            "9000",
            "--request-timeout",
            "3",
            "--chain-id",
            "80002",
            "--log-level",
            "debug",
            "--log-json",
        ]);

        let mut config = Config::default();
        cli.apply(&mut config).unwrap();

        assert_eq!(config.rpc_urls(), vec!["http://a", "http://b"]);
        assert_eq!(
            config.contract.address,
            address!("0000000000000000000000000000000000000001")
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.rpc.chain_id, 80002);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn test_bad_token_address() {
        let cli = parse(&["--token-address", "0x1234"]);
        assert!(cli.apply(&mut Config::default()).is_err());
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let cli = parse(&["--request-timeout", "0"]);
        assert!(cli.load_config().is_err());
    }
}
