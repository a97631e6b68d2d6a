pub mod cli;
pub mod core;
pub mod providers;

use crate::core::advice::AdviceProvider;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::history::HistoryLog;
use crate::core::rates::{RateProvider, SeriesWindow};
use crate::providers::advice::AdviceClient;
use crate::providers::exchange_rate_api::ExchangeRateApiClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates {
        base: Option<String>,
        target: Option<String>,
    },
    Chart {
        from: String,
        to: String,
        window: SeriesWindow,
    },
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Dashboard,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxdash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rate_client: Arc<dyn RateProvider> = Arc::new(ExchangeRateApiClient::new(
        config.exchange_rate_base_url(),
        &config.api_key,
    ));
    let advice_client: Option<Arc<dyn AdviceProvider>> = config
        .providers
        .advice
        .as_ref()
        .map(|p| Arc::new(AdviceClient::new(&p.base_url)) as Arc<dyn AdviceProvider>);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match command {
        AppCommand::Rates { base, target } => {
            let base = base.unwrap_or(config.base_currency);
            let target = target.unwrap_or(config.target_currency);
            cli::rates::run(rate_client.as_ref(), &base, &target).await
        }
        AppCommand::Chart { from, to, window } => {
            cli::chart::run(rate_client.as_ref(), clock.as_ref(), &from, &to, window).await
        }
        AppCommand::Convert { amount, from, to } => {
            // A fresh log per invocation: history lives only for the
            // process, so the advice call sees just this conversion.
            let mut history = HistoryLog::new();
            cli::convert::run(
                rate_client.as_ref(),
                advice_client.as_deref(),
                &mut history,
                clock.as_ref(),
                &amount,
                &from,
                &to,
            )
            .await
        }
        AppCommand::Dashboard => {
            cli::dashboard::run(
                rate_client,
                advice_client,
                clock,
                &config.base_currency,
                &config.target_currency,
            )
            .await
        }
    }
}
