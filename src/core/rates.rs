//! Rate retrieval abstractions and core types.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Failure modes of the remote rate API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("rate API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("rate API returned \"{result}\" for base {base}")]
    Api { result: String, base: String },
    #[error("no rate for {symbol} in response for base {base}")]
    MissingSymbol { symbol: String, base: String },
}

/// The historical window used to build a rate chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesWindow {
    /// Last 7 days, one point per day.
    Daily,
    /// Last 12 months, one point per month.
    Monthly,
    /// Last 5 years, one point per year.
    Yearly,
}

impl SeriesWindow {
    pub fn start_from(&self, end: NaiveDate) -> NaiveDate {
        match self {
            SeriesWindow::Daily => end - Days::new(7),
            SeriesWindow::Monthly => end - Months::new(12),
            SeriesWindow::Yearly => end - Months::new(60),
        }
    }

    /// The next step date, one day/month/year later.
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            SeriesWindow::Daily => date + Days::new(1),
            SeriesWindow::Monthly => date + Months::new(1),
            SeriesWindow::Yearly => date + Months::new(12),
        }
    }

    /// Number of calendar steps from start to end inclusive. Used to size
    /// progress bars; the fetched series can only be shorter.
    pub fn step_count(&self) -> u64 {
        match self {
            SeriesWindow::Daily => 8,
            SeriesWindow::Monthly => 13,
            SeriesWindow::Yearly => 6,
        }
    }
}

impl Display for SeriesWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SeriesWindow::Daily => "daily",
                SeriesWindow::Monthly => "monthly",
                SeriesWindow::Yearly => "yearly",
            }
        )
    }
}

impl FromStr for SeriesWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(SeriesWindow::Daily),
            "monthly" => Ok(SeriesWindow::Monthly),
            "yearly" => Ok(SeriesWindow::Yearly),
            _ => Err(anyhow::anyhow!("Invalid series window: {}", s)),
        }
    }
}

/// One observation of a pair's rate on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// An ordered sequence of rate points, strictly ascending by date and
/// bounded by the requested window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSeries {
    points: Vec<RatePoint>,
}

impl RateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: RatePoint) {
        debug_assert!(
            self.points.last().is_none_or(|last| last.date < point.date),
            "rate points must be appended in ascending date order"
        );
        self.points.push(point);
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&RatePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RatePoint> {
        self.points.last()
    }

    pub fn min_rate(&self) -> Option<f64> {
        self.points.iter().map(|p| p.rate).reduce(f64::min)
    }

    pub fn max_rate(&self) -> Option<f64> {
        self.points.iter().map(|p| p.rate).reduce(f64::max)
    }
}

/// Result of the pair conversion endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairConversion {
    pub rate: f64,
    /// Present when the request included an amount.
    pub converted: Option<f64>,
}

/// A source of exchange rates for currency pairs.
///
/// Each call is independent and stateless: no caching, no retries.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Latest conversion rates for every currency quoted against `from`.
    async fn latest_rates(&self, from: &str) -> Result<BTreeMap<String, f64>>;

    /// Latest rate for a single pair.
    async fn latest_rate(&self, from: &str, to: &str) -> Result<f64>;

    /// The pair's rate on a given past date. `date` must not be in the
    /// future.
    async fn historical_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<f64>;

    /// Pair conversion with an optional amount precomputed upstream.
    async fn pair_rate(
        &self,
        from: &str,
        to: &str,
        amount: Option<f64>,
    ) -> Result<PairConversion>;

    /// Conversion factor into USD, used to denominate fees.
    async fn usd_factor(&self, from: &str) -> Result<f64> {
        self.latest_rate(from, "USD").await
    }
}

/// Builds a historical series for a pair by issuing one rate call per
/// day/month/year step from the window start up to `today` inclusive.
///
/// Steps whose call fails are skipped, not retried, so the series can be
/// shorter than the window. `on_step` observes the accumulated series
/// after every step, which lets callers update a chart or progress bar
/// while the fan-out is still running. The fan-out stays sequential to
/// preserve the one-call-per-step fetch order.
pub async fn fetch_series<F>(
    provider: &dyn RateProvider,
    from: &str,
    to: &str,
    window: SeriesWindow,
    today: NaiveDate,
    mut on_step: F,
) -> RateSeries
where
    F: FnMut(&RateSeries),
{
    let mut series = RateSeries::new();
    let mut current = window.start_from(today);

    while current <= today {
        match provider.historical_rate(from, to, current).await {
            Ok(rate) => series.push(RatePoint {
                date: current,
                rate,
            }),
            Err(e) => {
                debug!(date = %current, %from, %to, "Skipping series step: {e}");
            }
        }
        on_step(&series);
        current = window.advance(current);
    }

    series
}
