use crate::core::currency::{CurrencyRateProvider, RateTable};
use crate::core::error::RateFetchError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = "vpsval/1.0";

/// Wire shape shared by the upstream API and the `/api/rates` proxy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesResponse {
    pub rates: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

/// Fetches a USD based rate table over HTTP with a single, time-boxed request.
pub struct ExchangeRateProvider {
    url: String,
    timeout: Duration,
}

impl ExchangeRateProvider {
    /// Talks to exchangerate-api.com style upstreams (`/v4/latest/USD`).
    pub fn upstream(base_url: &str, timeout: Duration) -> Self {
        ExchangeRateProvider {
            url: format!("{}/v4/latest/USD", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    /// Talks to a running rate proxy (`/api/rates`).
    pub fn proxy(base_url: &str, timeout: Duration) -> Self {
        ExchangeRateProvider {
            url: format!("{}/api/rates", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateProvider {
    #[instrument(name = "RateFetch", skip(self), fields(url = %self.url))]
    async fn fetch_rates(&self) -> Result<RateTable, RateFetchError> {
        debug!("Requesting exchange rates from {}", self.url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;
        let response = client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RateFetchError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: RatesResponse =
            serde_json::from_str(&text).map_err(|e| RateFetchError::Parse(e.to_string()))?;
        if data.stale {
            warn!("Rate source returned a stale table");
        }

        let table = RateTable::new(data.rates)?;
        debug!("Received {} exchange rates", table.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RATES_BODY: &str = r#"{
        "base": "USD",
        "date": "2024-01-01",
        "rates": {"USD": 1, "CNY": 7.1, "EUR": 0.92, "JPY": 148.5}
    }"#;

    async fn mount(server: &MockServer, url_path: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RATES_BODY))
            .mount(&mock_server)
            .await;

        let provider = ExchangeRateProvider::upstream(&mock_server.uri(), Duration::from_secs(5));
        let rates = provider.fetch_rates().await.expect("Failed to get rates");
        assert_eq!(rates.len(), 4);
        assert_eq!(rates.rate("USD"), Some(1.0));
        assert_eq!(rates.rate("JPY"), Some(148.5));
    }

    #[tokio::test]
    async fn test_proxy_url_and_stale_flag() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/api/rates",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"rates": {"USD": 1.0, "CNY": 7.0}, "stale": true}"#),
        )
        .await;

        let provider =
            ExchangeRateProvider::proxy(&format!("{}/", mock_server.uri()), Duration::from_secs(5));
        assert!(provider.url().ends_with("/api/rates"));
        assert!(!provider.url().contains("//api"));
        let rates = provider.fetch_rates().await.unwrap();
        assert_eq!(rates.rate("CNY"), Some(7.0));
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "/v4/latest/USD", ResponseTemplate::new(500)).await;

        let provider = ExchangeRateProvider::upstream(&mock_server.uri(), Duration::from_secs(5));
        let err = provider.fetch_rates().await.unwrap_err();
        assert!(matches!(err, RateFetchError::Status(s) if s.as_u16() == 500));
        assert_eq!(err.to_string(), "HTTP error: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v4/latest/USD",
            ResponseTemplate::new(200).set_body_string(r#"{"result": "error"}"#),
        )
        .await;

        let provider = ExchangeRateProvider::upstream(&mock_server.uri(), Duration::from_secs(5));
        let err = provider.fetch_rates().await.unwrap_err();
        assert!(matches!(err, RateFetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_table_without_base() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v4/latest/USD",
            ResponseTemplate::new(200).set_body_string(r#"{"rates": {"CNY": 7.1}}"#),
        )
        .await;

        let provider = ExchangeRateProvider::upstream(&mock_server.uri(), Duration::from_secs(5));
        let err = provider.fetch_rates().await.unwrap_err();
        assert!(matches!(err, RateFetchError::InvalidTable(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v4/latest/USD",
            ResponseTemplate::new(200)
                .set_body_string(RATES_BODY)
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let provider =
            ExchangeRateProvider::upstream(&mock_server.uri(), Duration::from_millis(50));
        let err = provider.fetch_rates().await.unwrap_err();
        match err {
            RateFetchError::Request(e) => assert!(e.is_timeout()),
            other => panic!("Expected a timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_response_serialization_omits_fresh_flag() {
        let fresh = RatesResponse {
            rates: BTreeMap::from([("USD".to_string(), 1.0)]),
            stale: false,
        };
        assert_eq!(
            serde_json::to_value(&fresh).unwrap(),
            serde_json::json!({"rates": {"USD": 1.0}})
        );

        let stale = RatesResponse { stale: true, ..fresh };
        assert_eq!(
            serde_json::to_value(&stale).unwrap(),
            serde_json::json!({"rates": {"USD": 1.0}, "stale": true})
        );
    }
}
