//! Core business logic abstractions

pub mod advice;
pub mod clock;
pub mod config;
pub mod history;
pub mod log;
pub mod quote;
pub mod rates;
pub mod state;

// Re-export main types for cleaner imports
pub use advice::AdviceProvider;
pub use clock::{Clock, SystemClock};
pub use history::{HistoryLog, HistoryRecord, TradeSummary};
pub use quote::{Quote, compute_quote, parse_amount};
pub use rates::{RatePoint, RateProvider, RateSeries, SeriesWindow, UpstreamError, fetch_series};
pub use state::ConversionState;
