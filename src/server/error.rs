use crate::core::error::RateFetchError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Rates could not be served: the refresh failed and nothing was cached.
#[derive(Debug)]
pub struct RatesUnavailable(pub RateFetchError);

impl IntoResponse for RatesUnavailable {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Failed to serve exchange rates");
        let body = Json(json!({
            "error": "Failed to fetch exchange rates",
            "message": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<RateFetchError> for RatesUnavailable {
    fn from(err: RateFetchError) -> Self {
        RatesUnavailable(err)
    }
}
