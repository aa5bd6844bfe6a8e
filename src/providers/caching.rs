use crate::core::cache::{CachedRates, RateCache};
use crate::core::currency::{CurrencyRateProvider, RateTable};
use crate::core::error::RateFetchError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Serves a cached rate table while it is fresh, refreshes it from `inner`
/// otherwise, and falls back to the last known table if the refresh fails.
pub struct CachingRateProvider<T: CurrencyRateProvider> {
    inner: T,
    cache: Arc<RateCache>,
}

impl<T: CurrencyRateProvider> CachingRateProvider<T> {
    pub fn new(inner: T, cache: Arc<RateCache>) -> Self {
        Self { inner, cache }
    }

    /// Returns rates, preferring availability over freshness once any table
    /// has been fetched. Fails only when the refresh fails and nothing is cached.
    pub async fn rates(&self) -> Result<CachedRates, RateFetchError> {
        if let Some(table) = self.cache.get_fresh().await {
            return Ok(CachedRates {
                table,
                stale: false,
            });
        }

        debug!("Refreshing rate table from upstream");
        match self.inner.fetch_rates().await {
            Ok(table) => {
                let table = self.cache.put(table).await;
                Ok(CachedRates {
                    table,
                    stale: false,
                })
            }
            Err(err) => match self.cache.get_any().await {
                Some(previous) => {
                    warn!(error = %err, "Rate refresh failed, serving previous table");
                    Ok(CachedRates {
                        table: previous.table,
                        stale: true,
                    })
                }
                None => Err(err),
            },
        }
    }
}

#[async_trait]
impl<T: CurrencyRateProvider> CurrencyRateProvider for CachingRateProvider<T> {
    async fn fetch_rates(&self) -> Result<RateTable, RateFetchError> {
        let rates = self.rates().await?;
        Ok(rates.table.as_ref().clone())
    }
}
