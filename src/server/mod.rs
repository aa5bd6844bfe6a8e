//! Caching proxy in front of the upstream exchange-rate API.

pub mod error;
pub mod handlers;

use crate::core::currency::CurrencyRateProvider;
use crate::providers::caching::CachingRateProvider;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    routing::get,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

/// Start the rate proxy and serve until Ctrl-C.
pub async fn start_server<T>(addr: SocketAddr, provider: Arc<CachingRateProvider<T>>) -> Result<()>
where
    T: CurrencyRateProvider + 'static,
{
    let app = create_router(provider);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Rate proxy listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router<T>(provider: Arc<CachingRateProvider<T>>) -> Router
where
    T: CurrencyRateProvider + 'static,
{
    Router::new()
        .route("/api/rates", get(handlers::rates::<T>))
        .route("/health", get(handlers::health))
        .with_state(provider)
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::X_FRAME_OPTIONS, "DENY"))
        .layer(security_header(header::REFERRER_POLICY, "strict-origin-when-cross-origin"))
        .layer(TraceLayer::new_for_http())
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Resolves once `signal` fires. A signal that cannot be installed never resolves.
async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_fires_on_signal() {
        shutdown_on(std::future::ready(Ok(()))).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_signal_keeps_serving() {
        let signal = std::future::ready(Err(std::io::Error::other("no signal handler")));
        let result = tokio::time::timeout(Duration::from_secs(3600), shutdown_on(signal)).await;
        assert!(result.is_err(), "shutdown must not fire when the signal is unavailable");
    }
}
