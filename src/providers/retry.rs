use crate::core::currency::{CurrencyRateProvider, RateTable};
use crate::core::error::RateFetchError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Runs `operation` up to `attempts` times with a linear backoff.
///
/// After failed attempt `i` the loop sleeps `i * base_delay` before trying
/// again (1x, 2x, ...). No sleep follows the final attempt. At least one
/// attempt is always made.
pub async fn with_backoff<F, Fut, T>(
    mut operation: F,
    attempts: u32,
    base_delay: Duration,
) -> Result<T, RateFetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RateFetchError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, err);
                if attempt >= attempts {
                    return Err(RateFetchError::Exhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                let delay = base_delay * attempt;
                debug!("Retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Wraps a provider with a bounded number of attempts.
pub struct RetryingRateProvider<T: CurrencyRateProvider> {
    inner: T,
    attempts: u32,
    base_delay: Duration,
}

impl<T: CurrencyRateProvider> RetryingRateProvider<T> {
    pub fn new(inner: T, attempts: u32) -> Self {
        Self {
            inner,
            attempts,
            base_delay: Duration::from_secs(1),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }
}

#[async_trait]
impl<T: CurrencyRateProvider> CurrencyRateProvider for RetryingRateProvider<T> {
    async fn fetch_rates(&self) -> Result<RateTable, RateFetchError> {
        with_backoff(|| self.inner.fetch_rates(), self.attempts, self.base_delay).await
    }
}
