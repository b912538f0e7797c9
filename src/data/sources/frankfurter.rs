//! Frankfurter exchange-rate API integration
//!
//! Range endpoint: `{base}/{start}..{end}?from=FROM&to=TO` answering
//! `{ "rates": { "<date>": { "<TO>": <number> } } }`.
//! Latest endpoint: `{base}/latest?from=FROM&to=TO` answering
//! `{ "rates": { "<TO>": <number> } }`.

use super::RateProvider;
use crate::currency::CurrencyPair;
use crate::error::{ChartError, Result};
use crate::types::{Date, Rate, RatePoint, DATE_FORMAT};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

pub const FRANKFURTER_BASE_URL: &str = "https://api.frankfurter.app";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Frankfurter data source (no API key required)
#[derive(Debug, Clone)]
pub struct FrankfurterSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RangeResponse {
    // BTreeMap orders ISO dates lexicographically, which is chronological
    rates: Option<BTreeMap<String, BTreeMap<String, Value>>>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: Option<BTreeMap<String, Value>>,
}

impl FrankfurterSource {
    /// Create a source against the public API
    pub fn new() -> Result<Self> {
        Self::with_base_url(FRANKFURTER_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source against another deployment of the API
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChartError::FetchError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the range endpoint for `pair` between `start` and `end`
    pub fn range_url(&self, pair: &CurrencyPair, start: Date, end: Date) -> String {
        format!(
            "{}/{}..{}?from={}&to={}",
            self.base_url,
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT),
            pair.from,
            pair.to
        )
    }

    pub fn latest_url(&self, pair: &CurrencyPair) -> String {
        format!("{}/latest?from={}&to={}", self.base_url, pair.from, pair.to)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChartError::FetchError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ChartError::FetchError(format!(
                "Frankfurter returned error: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ChartError::FetchError(format!("Failed to read response: {}", e)))
    }
}

/// Extract `to`-currency rates from a range response body, oldest first
pub fn parse_range_body(body: &str, to: &str) -> Result<Vec<RatePoint>> {
    let response: RangeResponse = serde_json::from_str(body)
        .map_err(|e| ChartError::DataFormatError(format!("JSON parse error: {}", e)))?;

    let rates = response
        .rates
        .ok_or_else(|| ChartError::DataFormatError("missing 'rates' in response".to_string()))?;

    rates
        .into_iter()
        .map(|(date_str, per_currency)| {
            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
                ChartError::DataFormatError(format!("Date parse error '{}': {}", date_str, e))
            })?;
            let rate = rate_for(&per_currency, to).map_err(|e| match e {
                ChartError::DataFormatError(msg) => {
                    ChartError::DataFormatError(format!("{} on {}", msg, date_str))
                }
                other => other,
            })?;
            Ok(RatePoint::new(date, rate))
        })
        .collect()
}

/// Extract the `to`-currency rate from a latest response body
pub fn parse_latest_body(body: &str, to: &str) -> Result<Rate> {
    let response: LatestResponse = serde_json::from_str(body)
        .map_err(|e| ChartError::DataFormatError(format!("JSON parse error: {}", e)))?;

    let rates = response
        .rates
        .ok_or_else(|| ChartError::DataFormatError("missing 'rates' in response".to_string()))?;

    rate_for(&rates, to)
}

fn rate_for(rates: &BTreeMap<String, Value>, to: &str) -> Result<Rate> {
    rates
        .get(to)
        .ok_or_else(|| ChartError::DataFormatError(format!("missing rate for {}", to)))?
        .as_f64()
        .ok_or_else(|| ChartError::DataFormatError(format!("non-numeric rate for {}", to)))
}

impl RateProvider for FrankfurterSource {
    fn name(&self) -> &str {
        "frankfurter"
    }

    async fn fetch_range(
        &self,
        pair: &CurrencyPair,
        start: Date,
        end: Date,
    ) -> Result<Vec<RatePoint>> {
        let body = self.get_text(&self.range_url(pair, start, end)).await?;
        parse_range_body(&body, &pair.to)
    }

    async fn fetch_latest(&self, pair: &CurrencyPair) -> Result<Rate> {
        let body = self.get_text(&self.latest_url(pair)).await?;
        parse_latest_body(&body, &pair.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local server answering a single request with `response`; returns its base URL
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn week() -> (Date, Date) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_frankfurter_source_creation() {
        let source = FrankfurterSource::new();
        assert!(source.is_ok());
        assert_eq!(source.unwrap().name(), "frankfurter");
    }

    #[test]
    fn test_range_url() {
        let source =
            FrankfurterSource::with_base_url("http://localhost:8080/", Duration::from_secs(1))
                .unwrap();
        let pair = CurrencyPair::new("usd", "eur");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(
            source.range_url(&pair, start, end),
            "http://localhost:8080/2024-01-01..2024-01-08?from=USD&to=EUR"
        );
        assert_eq!(
            source.latest_url(&pair),
            "http://localhost:8080/latest?from=USD&to=EUR"
        );
    }

    #[test]
    fn test_parse_range_sorted() {
        let body = r#"{
            "amount": 1.0, "base": "USD",
            "start_date": "2024-01-02", "end_date": "2024-01-04",
            "rates": {
                "2024-01-04": {"EUR": 0.915},
                "2024-01-02": {"EUR": 0.911},
                "2024-01-03": {"EUR": 0.913}
            }
        }"#;

        let points = parse_range_body(body, "EUR").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].label(), "2024-01-02");
        assert_eq!(points[2].rate, 0.915);
    }

    #[test]
    fn test_parse_range_missing_rates() {
        let err = parse_range_body(r#"{"message": "not found"}"#, "EUR").unwrap_err();
        assert!(matches!(err, ChartError::DataFormatError(_)));
    }

    #[test]
    fn test_parse_range_missing_target_currency() {
        let body = r#"{"rates": {"2024-01-02": {"GBP": 0.79}}}"#;
        let err = parse_range_body(body, "EUR").unwrap_err();
        assert!(err.to_string().contains("2024-01-02"));
    }

    #[test]
    fn test_parse_range_not_json() {
        let err = parse_range_body("<html>", "EUR").unwrap_err();
        assert!(matches!(err, ChartError::DataFormatError(_)));
    }

    #[test]
    fn test_parse_latest() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2024-01-05","rates":{"EUR":0.9142}}"#;
        assert_eq!(parse_latest_body(body, "EUR").unwrap(), 0.9142);
        assert!(parse_latest_body(body, "GBP").is_err());
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let source = FrankfurterSource::with_base_url(&base, Duration::from_secs(5)).unwrap();
        let (start, end) = week();

        let err = source
            .fetch_range(&CurrencyPair::new("USD", "EUR"), start, end)
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::FetchError(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            FrankfurterSource::with_base_url(&format!("http://{}", addr), Duration::from_secs(5))
                .unwrap();
        let err = source
            .fetch_latest(&CurrencyPair::new("USD", "EUR"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::FetchError(_)));
    }

    #[tokio::test]
    async fn test_success_body_is_parsed() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 63\r\nconnection: close\r\n\r\n{\"rates\":{\"2024-01-02\":{\"EUR\":0.91},\"2024-01-03\":{\"EUR\":0.92}}}",
        )
        .await;
        let source = FrankfurterSource::with_base_url(&base, Duration::from_secs(5)).unwrap();
        let (start, end) = week();

        let points = source
            .fetch_range(&CurrencyPair::new("USD", "EUR"), start, end)
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].rate, 0.92);
    }

    #[tokio::test]
    async fn test_bad_body_is_format_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 6\r\nconnection: close\r\n\r\n<html>",
        )
        .await;
        let source = FrankfurterSource::with_base_url(&base, Duration::from_secs(5)).unwrap();

        let err = source
            .fetch_latest(&CurrencyPair::new("USD", "EUR"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::DataFormatError(_)));
    }
}
