pub mod caching;
pub mod exchange_rate;
pub mod retry;

use crate::core::config::AppConfig;
use exchange_rate::ExchangeRateProvider;
use std::time::Duration;

/// Builds the HTTP provider the CLI reads rates from: the proxy when one is
/// configured, the upstream API otherwise.
pub fn rate_source(config: &AppConfig) -> ExchangeRateProvider {
    let timeout = Duration::from_secs(config.providers.exchange_rate.timeout_secs);
    match &config.providers.proxy {
        Some(proxy) => ExchangeRateProvider::proxy(&proxy.base_url, timeout),
        None => ExchangeRateProvider::upstream(&config.providers.exchange_rate.base_url, timeout),
    }
}
