use super::error::RatesUnavailable;
use crate::core::currency::CurrencyRateProvider;
use crate::providers::caching::CachingRateProvider;
use crate::providers::exchange_rate::RatesResponse;
use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

/// `GET /api/rates`
pub async fn rates<T: CurrencyRateProvider + 'static>(
    State(provider): State<Arc<CachingRateProvider<T>>>,
) -> Result<Json<RatesResponse>, RatesUnavailable> {
    let cached = provider.rates().await?;
    Ok(Json(RatesResponse {
        rates: cached.table.as_map().clone(),
        stale: cached.stale,
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
