//! Client for the exchangerate-api.com v6 HTTP API.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::core::rates::{PairConversion, RateProvider, UpstreamError};

/// Stateless client for the rate API. Every call is an independent HTTP
/// request; there is no caching, retry, or rate-limit handling.
pub struct ExchangeRateApiClient {
    base_url: String,
    api_key: String,
}

impl ExchangeRateApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        ExchangeRateApiClient {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Requesting rate data from {}", url);

        let client = reqwest::Client::builder().user_agent("fxdash/1.0").build()?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response from {}: {}", url, e))
    }

    /// Checks the API-level `result` field common to all v6 payloads.
    fn check_result(result: &str, error_type: Option<String>, base: &str) -> Result<()> {
        if result == "success" {
            return Ok(());
        }
        Err(UpstreamError::Api {
            result: error_type.unwrap_or_else(|| result.to_string()),
            base: base.to_string(),
        }
        .into())
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    conversion_rate: Option<f64>,
    conversion_result: Option<f64>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiClient {
    #[instrument(name = "LatestRates", skip(self), fields(from = %from))]
    async fn latest_rates(&self, from: &str) -> Result<BTreeMap<String, f64>> {
        let url = format!("{}/{}/latest/{}", self.base_url, self.api_key, from);
        let data: RatesResponse = self.get_json(&url).await?;
        Self::check_result(&data.result, data.error_type, from)?;
        Ok(data.conversion_rates)
    }

    async fn latest_rate(&self, from: &str, to: &str) -> Result<f64> {
        let rates = self.latest_rates(from).await?;
        rates.get(to).copied().ok_or_else(|| {
            UpstreamError::MissingSymbol {
                symbol: to.to_string(),
                base: from.to_string(),
            }
            .into()
        })
    }

    #[instrument(name = "HistoricalRate", skip(self), fields(from = %from, to = %to, date = %date))]
    async fn historical_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<f64> {
        if date > Local::now().date_naive() {
            anyhow::bail!("Historical rate requested for a future date: {}", date);
        }

        let url = format!(
            "{}/{}/history/{}/{}/{:02}/{:02}",
            self.base_url,
            self.api_key,
            from,
            date.year(),
            date.month(),
            date.day()
        );
        let data: RatesResponse = self.get_json(&url).await?;
        Self::check_result(&data.result, data.error_type, from)?;
        data.conversion_rates.get(to).copied().ok_or_else(|| {
            UpstreamError::MissingSymbol {
                symbol: to.to_string(),
                base: from.to_string(),
            }
            .into()
        })
    }

    #[instrument(name = "PairRate", skip(self), fields(from = %from, to = %to))]
    async fn pair_rate(
        &self,
        from: &str,
        to: &str,
        amount: Option<f64>,
    ) -> Result<PairConversion> {
        let url = match amount {
            Some(amount) => format!(
                "{}/{}/pair/{}/{}/{}",
                self.base_url, self.api_key, from, to, amount
            ),
            None => format!("{}/{}/pair/{}/{}", self.base_url, self.api_key, from, to),
        };
        let data: PairResponse = self.get_json(&url).await?;
        Self::check_result(&data.result, data.error_type, from)?;

        let rate = data.conversion_rate.ok_or_else(|| UpstreamError::MissingSymbol {
            symbol: to.to_string(),
            base: from.to_string(),
        })?;
        Ok(PairConversion {
            rate,
            converted: data.conversion_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "test-key";

    async fn mock_endpoint(endpoint: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_latest_rate_success() {
        let body = r#"{
            "result": "success",
            "base_code": "EUR",
            "conversion_rates": {"JPY": 162.3, "USD": 1.08}
        }"#;
        let server = mock_endpoint(&format!("/{KEY}/latest/EUR"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let rate = client.latest_rate("EUR", "JPY").await.unwrap();
        assert_eq!(rate, 162.3);
    }

    #[tokio::test]
    async fn test_latest_rate_error_payload() {
        let body = r#"{"result": "error", "error-type": "invalid-key"}"#;
        let server = mock_endpoint(&format!("/{KEY}/latest/EUR"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let err = client.latest_rate("EUR", "JPY").await.unwrap_err();
        match err.downcast_ref::<UpstreamError>() {
            Some(UpstreamError::Api { result, base }) => {
                assert_eq!(result, "invalid-key");
                assert_eq!(base, "EUR");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_latest_rate_missing_target_symbol() {
        let body = r#"{"result": "success", "conversion_rates": {"USD": 1.08}}"#;
        let server = mock_endpoint(&format!("/{KEY}/latest/EUR"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let err = client.latest_rate("EUR", "JPY").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UpstreamError>(),
            Some(UpstreamError::MissingSymbol { .. })
        ));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = mock_endpoint(&format!("/{KEY}/latest/EUR"), 500, "").await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let err = client.latest_rates("EUR").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UpstreamError>(),
            Some(UpstreamError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_latest_rates_full_table() {
        let body = r#"{
            "result": "success",
            "conversion_rates": {"EUR": 0.92, "JPY": 149.8, "GBP": 0.79}
        }"#;
        let server = mock_endpoint(&format!("/{KEY}/latest/USD"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let rates = client.latest_rates("USD").await.unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["JPY"], 149.8);
        // BTreeMap iterates in code order for a stable table.
        let codes: Vec<&String> = rates.keys().collect();
        assert_eq!(codes, ["EUR", "GBP", "JPY"]);
    }

    #[tokio::test]
    async fn test_historical_rate_url_pads_month_and_day() {
        let body = r#"{"result": "success", "conversion_rates": {"JPY": 158.1}}"#;
        let server = mock_endpoint(&format!("/{KEY}/history/EUR/2024/03/05"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let rate = client.historical_rate("EUR", "JPY", date).await.unwrap();
        assert_eq!(rate, 158.1);
    }

    #[tokio::test]
    async fn test_historical_rate_rejects_future_date() {
        let client = ExchangeRateApiClient::new("http://unused.invalid", KEY);
        let future = Local::now().date_naive() + chrono::Days::new(2);
        let err = client.historical_rate("EUR", "JPY", future).await.unwrap_err();
        assert!(err.to_string().contains("future date"));
    }

    #[tokio::test]
    async fn test_pair_rate_without_amount() {
        let body = r#"{"result": "success", "conversion_rate": 0.85}"#;
        let server = mock_endpoint(&format!("/{KEY}/pair/USD/EUR"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let pair = client.pair_rate("USD", "EUR", None).await.unwrap();
        assert_eq!(pair.rate, 0.85);
        assert!(pair.converted.is_none());
    }

    #[tokio::test]
    async fn test_pair_rate_with_amount() {
        let body = r#"{"result": "success", "conversion_rate": 0.85, "conversion_result": 212.5}"#;
        let server = mock_endpoint(&format!("/{KEY}/pair/USD/EUR/250"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let pair = client.pair_rate("USD", "EUR", Some(250.0)).await.unwrap();
        assert_eq!(pair.rate, 0.85);
        assert_eq!(pair.converted, Some(212.5));
    }

    #[tokio::test]
    async fn test_usd_factor_uses_latest_endpoint() {
        let body = r#"{"result": "success", "conversion_rates": {"USD": 1.1}}"#;
        let server = mock_endpoint(&format!("/{KEY}/latest/EUR"), 200, body).await;

        let client = ExchangeRateApiClient::new(&server.uri(), KEY);
        let factor = client.usd_factor("EUR").await.unwrap();
        assert_eq!(factor, 1.1);
    }
}
