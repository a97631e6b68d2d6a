//! One-shot conversion quote with fee breakdown.

use super::ui;
use crate::core::advice::AdviceProvider;
use crate::core::clock::Clock;
use crate::core::history::{HistoryLog, HistoryRecord};
use crate::core::quote::{Quote, compute_quote, parse_amount};
use crate::core::rates::RateProvider;
use anyhow::Result;
use comfy_table::Cell;
use tracing::{error, warn};

pub async fn run(
    provider: &dyn RateProvider,
    advice: Option<&dyn AdviceProvider>,
    history: &mut HistoryLog,
    clock: &dyn Clock,
    amount_input: &str,
    from: &str,
    to: &str,
) -> Result<()> {
    let amount = parse_amount(amount_input);

    let base_rate = match provider.pair_rate(from, to, None).await {
        Ok(pair) => pair.rate,
        Err(e) => {
            error!(%from, %to, "Failed to fetch pair rate: {e}");
            println!(
                "{}",
                ui::style_text(
                    &format!("Could not fetch rate for {from}/{to}: {e}"),
                    ui::StyleType::Error
                )
            );
            return Ok(());
        }
    };

    // A missing USD factor only degrades the fee display, never the quote.
    let usd_rate = match provider.usd_factor(from).await {
        Ok(rate) => Some(rate),
        Err(e) => {
            warn!(%from, "Failed to fetch USD factor: {e}");
            None
        }
    };

    let quote = compute_quote(amount, base_rate, usd_rate.unwrap_or(0.0));
    println!(
        "{}",
        render_quote(&quote, base_rate, usd_rate, from, to, clock)
    );

    history.append(HistoryRecord {
        base: from.to_string(),
        target: to.to_string(),
        exchange_rate: base_rate,
        amount: quote.amount,
        converted_amount: quote.net_received,
    });

    if let Some(advice) = advice {
        let trades = history.query(from, to);
        match advice.evaluate(from, to, &trades).await {
            Ok(messages) => {
                for message in messages {
                    println!("{message}");
                }
            }
            Err(e) => {
                error!(%from, %to, "Advice evaluation failed: {e}");
                println!(
                    "{}",
                    ui::style_text(&format!("Advice unavailable: {e}"), ui::StyleType::Error)
                );
            }
        }
    }

    Ok(())
}

fn render_quote(
    quote: &Quote,
    base_rate: f64,
    usd_rate: Option<f64>,
    from: &str,
    to: &str,
    clock: &dyn Clock,
) -> String {
    let mut table = ui::new_styled_table();
    table.add_row(vec![
        ui::header_cell("Amount"),
        ui::value_cell(format!("{:.2} {from}", quote.amount)),
    ]);
    table.add_row(vec![
        ui::header_cell("Exchange Rate"),
        ui::value_cell(format!("1 {from} = {base_rate} {to}")),
    ]);
    table.add_row(vec![
        ui::header_cell("Conversion Fee"),
        ui::value_cell(format!("{:.2} {from}", quote.fee)),
    ]);
    table.add_row(vec![
        ui::header_cell("Fee (USD)"),
        usd_rate.map_or_else(
            || Cell::new("N/A"),
            |_| ui::value_cell(format!("{:.2} USD", quote.usd_fee)),
        ),
    ]);
    table.add_row(vec![
        ui::header_cell("You'll receive"),
        ui::value_cell(format!("{:.2} {to}", quote.net_received)),
    ]);
    table.add_row(vec![
        ui::header_cell("Exchange Date"),
        ui::value_cell(clock.today().to_string()),
    ]);

    format!(
        "{}\n{table}",
        ui::style_text("Currency Converter", ui::StyleType::Title)
    )
}
