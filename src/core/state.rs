//! Mutable state behind the conversion view.

use crate::core::quote::{Quote, compute_quote};
use crate::core::rates::{RateSeries, SeriesWindow};
use tracing::debug;

/// State read by the dashboard views and written by user input and
/// rate fetches.
///
/// Every fetch is tagged with the epoch current when it was issued.
/// Selecting a new pair bumps the epoch, so a response that arrives for
/// a previously selected pair no longer matches and is discarded instead
/// of overwriting the current pair's values.
#[derive(Debug, Default)]
pub struct ConversionState {
    epoch: u64,
    pub base: String,
    pub target: String,
    pub base_rate: Option<f64>,
    pub usd_rate: Option<f64>,
    pub quote: Quote,
    pub daily: RateSeries,
    pub monthly: RateSeries,
    pub yearly: RateSeries,
}

impl ConversionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a currency pair, clearing rates and series fetched for the
    /// previous pair. Returns the new epoch to tag in-flight fetches with.
    pub fn select_pair(&mut self, base: &str, target: &str) -> u64 {
        self.epoch += 1;
        self.base = base.to_string();
        self.target = target.to_string();
        self.base_rate = None;
        self.usd_rate = None;
        self.daily = RateSeries::new();
        self.monthly = RateSeries::new();
        self.yearly = RateSeries::new();
        self.recompute();
        self.epoch
    }

    pub fn apply_latest_rate(&mut self, epoch: u64, rate: f64) -> bool {
        if !self.accepts(epoch, "latest rate") {
            return false;
        }
        self.base_rate = Some(rate);
        self.recompute();
        true
    }

    pub fn apply_usd_rate(&mut self, epoch: u64, rate: f64) -> bool {
        if !self.accepts(epoch, "usd rate") {
            return false;
        }
        self.usd_rate = Some(rate);
        self.recompute();
        true
    }

    pub fn apply_series(&mut self, epoch: u64, window: SeriesWindow, series: RateSeries) -> bool {
        if !self.accepts(epoch, "series") {
            return false;
        }
        match window {
            SeriesWindow::Daily => self.daily = series,
            SeriesWindow::Monthly => self.monthly = series,
            SeriesWindow::Yearly => self.yearly = series,
        }
        true
    }

    pub fn series(&self, window: SeriesWindow) -> &RateSeries {
        match window {
            SeriesWindow::Daily => &self.daily,
            SeriesWindow::Monthly => &self.monthly,
            SeriesWindow::Yearly => &self.yearly,
        }
    }

    /// Updates the amount and recomputes the quote synchronously.
    pub fn set_amount(&mut self, amount: f64) {
        self.quote = compute_quote(
            amount,
            self.base_rate.unwrap_or(0.0),
            self.usd_rate.unwrap_or(0.0),
        );
    }

    /// Clears the transient amount fields after a conversion is committed.
    pub fn reset_amount(&mut self) {
        self.set_amount(0.0);
    }

    fn recompute(&mut self) {
        self.set_amount(self.quote.amount);
    }

    fn accepts(&self, epoch: u64, what: &str) -> bool {
        if epoch != self.epoch {
            debug!(
                stale = epoch,
                current = self.epoch,
                "Discarding {what} fetched for a superseded pair"
            );
            return false;
        }
        true
    }
}
