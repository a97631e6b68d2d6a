//! Contract with the downstream advice collaborator.
//!
//! The core's only obligation is to supply the filtered conversion
//! history; the response messages are rendered verbatim.

use crate::core::history::TradeSummary;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Request body for the remote evaluation call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest<'a> {
    pub base: &'a str,
    pub target: &'a str,
    pub trade_history: &'a [TradeSummary],
}

#[async_trait]
pub trait AdviceProvider: Send + Sync {
    /// Evaluates a pair's trade history remotely and returns the advice
    /// messages to display.
    async fn evaluate(
        &self,
        base: &str,
        target: &str,
        trade_history: &[TradeSummary],
    ) -> Result<Vec<String>>;
}
