//! Interactive conversion dashboard session.
//!
//! Owns the ConversionState and HistoryLog for the lifetime of the
//! session. Selecting a pair kicks off the rate and series fetches in a
//! background task; the prompt stays responsive and stale responses for
//! superseded pairs are dropped by the state's epoch check.

use super::{chart, ui};
use crate::core::advice::AdviceProvider;
use crate::core::clock::Clock;
use crate::core::history::{HistoryLog, HistoryRecord};
use crate::core::quote::parse_amount;
use crate::core::rates::{RateProvider, SeriesWindow, fetch_series};
use crate::core::state::ConversionState;
use anyhow::Result;
use comfy_table::Cell;
use console::Term;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

const HELP: &str = "\
Commands:
  pair FROM TO      select a currency pair (fetches rates + history)
  amount N          set the amount to convert
  show              show the current quote
  chart [daily|monthly|yearly]
                    show the fetched rate history
  convert           commit the conversion to the session history
  history           list committed conversions
  advice            evaluate the pair's trade history remotely
  quit              leave the dashboard";

pub async fn run(
    provider: Arc<dyn RateProvider>,
    advice: Option<Arc<dyn AdviceProvider>>,
    clock: Arc<dyn Clock>,
    initial_base: &str,
    initial_target: &str,
) -> Result<()> {
    let term = Term::stdout();
    let state = Arc::new(Mutex::new(ConversionState::new()));
    let mut history = HistoryLog::new();

    println!("{}", ui::style_text("fxdash", ui::StyleType::Title));
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));
    println!();

    select_pair(&state, &provider, &clock, initial_base, initial_target).await;
    println!("Selected {initial_base}/{initial_target}; fetching rates in the background.");

    loop {
        term.write_str("fxdash> ")?;
        let line = term.read_line()?;
        if line.is_empty() && !term.is_term() {
            // EOF on a non-interactive stdin
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "pair" => match (parts.next(), parts.next()) {
                (Some(from), Some(to)) => {
                    let from = from.to_uppercase();
                    let to = to.to_uppercase();
                    select_pair(&state, &provider, &clock, &from, &to).await;
                    println!("Selected {from}/{to}; fetching rates in the background.");
                }
                _ => println!("usage: pair FROM TO"),
            },
            "amount" => {
                let amount = parse_amount(parts.next().unwrap_or(""));
                let mut state = state.lock().await;
                state.set_amount(amount);
                println!("{}", render_quote(&state));
            }
            "show" => {
                let state = state.lock().await;
                println!("{}", render_quote(&state));
            }
            "chart" => {
                let window = match parts.next().unwrap_or("daily").parse::<SeriesWindow>() {
                    Ok(window) => window,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let state = state.lock().await;
                let series = state.series(window);
                if series.is_empty() {
                    println!(
                        "No {window} history yet for {}/{} (still fetching, or unavailable)",
                        state.base, state.target
                    );
                } else {
                    println!("{}", chart::render_table(series));
                }
            }
            "convert" => {
                let mut state = state.lock().await;
                match state.base_rate {
                    Some(rate) if state.quote.amount > 0.0 => {
                        let record = HistoryRecord {
                            base: state.base.clone(),
                            target: state.target.clone(),
                            exchange_rate: rate,
                            amount: state.quote.amount,
                            converted_amount: state.quote.net_received,
                        };
                        println!(
                            "Converted {:.2} {} into {:.2} {}",
                            record.amount, record.base, record.converted_amount, record.target
                        );
                        history.append(record);
                        state.reset_amount();
                    }
                    Some(_) => println!("Set an amount first (amount N)"),
                    None => println!("Rate not loaded yet; try again shortly"),
                }
            }
            "history" => print_history(&history),
            "advice" => {
                let (base, target) = {
                    let state = state.lock().await;
                    (state.base.clone(), state.target.clone())
                };
                match &advice {
                    Some(advice) => {
                        let trades = history.query(&base, &target);
                        match advice.evaluate(&base, &target, &trades).await {
                            Ok(messages) => {
                                for message in messages {
                                    println!("{message}");
                                }
                            }
                            Err(e) => println!(
                                "{}",
                                ui::style_text(
                                    &format!("Advice unavailable: {e}"),
                                    ui::StyleType::Error
                                )
                            ),
                        }
                    }
                    None => println!("No advice endpoint configured"),
                }
            }
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            other => println!("Unknown command: {other} (try 'help')"),
        }
    }

    Ok(())
}

async fn select_pair(
    state: &Arc<Mutex<ConversionState>>,
    provider: &Arc<dyn RateProvider>,
    clock: &Arc<dyn Clock>,
    from: &str,
    to: &str,
) {
    let epoch = state.lock().await.select_pair(from, to);
    spawn_pair_fetch(
        Arc::clone(state),
        Arc::clone(provider),
        Arc::clone(clock),
        from.to_string(),
        to.to_string(),
        epoch,
    );
}

/// Fetches the latest rate, the USD factor, and the three historical
/// series for a pair, in that order, writing each result into the shared
/// state under the given epoch. The daily fetch completes fully before
/// the monthly one begins, and the monthly before the yearly.
fn spawn_pair_fetch(
    state: Arc<Mutex<ConversionState>>,
    provider: Arc<dyn RateProvider>,
    clock: Arc<dyn Clock>,
    from: String,
    to: String,
    epoch: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match provider.latest_rate(&from, &to).await {
            Ok(rate) => {
                state.lock().await.apply_latest_rate(epoch, rate);
            }
            Err(e) => warn!(%from, %to, "Failed to fetch latest rate: {e}"),
        }

        match provider.usd_factor(&from).await {
            Ok(rate) => {
                state.lock().await.apply_usd_rate(epoch, rate);
            }
            Err(e) => warn!(%from, "Failed to fetch USD factor: {e}"),
        }

        for window in [
            SeriesWindow::Daily,
            SeriesWindow::Monthly,
            SeriesWindow::Yearly,
        ] {
            let series =
                fetch_series(provider.as_ref(), &from, &to, window, clock.today(), |_| {}).await;
            if !state.lock().await.apply_series(epoch, window, series) {
                // The pair changed mid-fetch; the remaining windows would
                // be stale too.
                return;
            }
        }
    })
}

fn render_quote(state: &ConversionState) -> String {
    let mut table = ui::new_styled_table();
    table.add_row(vec![
        ui::header_cell("Pair"),
        Cell::new(format!("{} / {}", state.base, state.target)),
    ]);
    table.add_row(vec![
        ui::header_cell("Exchange Rate"),
        ui::optional_rate_cell(state.base_rate, 4),
    ]);
    table.add_row(vec![
        ui::header_cell("Amount"),
        ui::value_cell(format!("{:.2} {}", state.quote.amount, state.base)),
    ]);
    table.add_row(vec![
        ui::header_cell("Conversion Fee"),
        ui::value_cell(format!("{:.2} {}", state.quote.fee, state.base)),
    ]);
    table.add_row(vec![
        ui::header_cell("Fee (USD)"),
        match state.usd_rate {
            Some(_) => ui::value_cell(format!("{:.2} USD", state.quote.usd_fee)),
            None => Cell::new("N/A"),
        },
    ]);
    table.add_row(vec![
        ui::header_cell("You'll receive"),
        ui::value_cell(format!("{:.2} {}", state.quote.net_received, state.target)),
    ]);
    table.to_string()
}

fn print_history(history: &HistoryLog) {
    if history.is_empty() {
        println!("No conversions recorded in this session");
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Base"),
        ui::header_cell("Target"),
        ui::header_cell("Rate"),
        ui::header_cell("Amount"),
        ui::header_cell("Received"),
    ]);
    for record in history.iter() {
        table.add_row(vec![
            Cell::new(&record.base),
            Cell::new(&record.target),
            ui::value_cell(format!("{:.4}", record.exchange_rate)),
            ui::value_cell(format!("{:.2}", record.amount)),
            ui::value_cell(format!("{:.2}", record.converted_amount)),
        ]);
    }
    println!("{table}");
}
