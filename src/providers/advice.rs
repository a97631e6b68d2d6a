//! HTTP client for the remote advice pipeline.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::advice::{AdviceProvider, AdviceRequest};
use crate::core::history::TradeSummary;
use crate::core::rates::UpstreamError;

pub struct AdviceClient {
    base_url: String,
}

impl AdviceClient {
    pub fn new(base_url: &str) -> Self {
        AdviceClient {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    message: Vec<String>,
}

#[async_trait]
impl AdviceProvider for AdviceClient {
    #[instrument(name = "AdviceEvaluate", skip(self, trade_history), fields(base = %base, target = %target))]
    async fn evaluate(
        &self,
        base: &str,
        target: &str,
        trade_history: &[TradeSummary],
    ) -> Result<Vec<String>> {
        let url = format!("{}/pipeline/evaluate", self.base_url);
        debug!(
            records = trade_history.len(),
            "Posting trade history for evaluation"
        );

        let client = reqwest::Client::builder().user_agent("fxdash/1.0").build()?;
        let response = client
            .post(&url)
            .json(&AdviceRequest {
                base,
                target,
                trade_history,
            })
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                url,
            }
            .into());
        }

        let data: AdviceResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse advice response: {}", e))?;
        Ok(data.message)
    }
}
