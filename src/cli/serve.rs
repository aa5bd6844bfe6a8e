use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::providers::caching::CachingRateProvider;
use crate::providers::exchange_rate::ExchangeRateProvider;
use crate::server;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Resolves the listen address, command line first, config second.
pub fn listen_addr(config: &AppConfig, args: &ServeArgs) -> Result<SocketAddr> {
    let host = args.host.as_deref().unwrap_or(&config.server.host);
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("Invalid listen host: {host}"))?;
    Ok(SocketAddr::from((ip, args.port.unwrap_or(config.server.port))))
}

/// Runs the caching rate proxy against the configured upstream.
pub async fn run(config: &AppConfig, args: ServeArgs) -> Result<()> {
    let addr = listen_addr(config, &args)?;
    let upstream_config = &config.providers.exchange_rate;
    let upstream = ExchangeRateProvider::upstream(
        &upstream_config.base_url,
        Duration::from_secs(upstream_config.timeout_secs),
    );
    let cache = Arc::new(RateCache::new(config.rates.cache_ttl()));
    info!(
        upstream = upstream.url(),
        ttl_ms = config.rates.cache_ttl_ms,
        "Configured rate upstream"
    );

    let provider = Arc::new(CachingRateProvider::new(upstream, cache));
    server::start_server(addr, provider).await
}
