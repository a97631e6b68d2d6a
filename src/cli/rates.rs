//! The "Explore" view: latest rates for a base currency.

use super::ui;
use crate::core::rates::RateProvider;
use anyhow::Result;
use comfy_table::Cell;
use tracing::error;

pub async fn run(provider: &dyn RateProvider, base: &str, target: &str) -> Result<()> {
    let rates = match provider.latest_rates(base).await {
        Ok(rates) => rates,
        Err(e) => {
            error!(%base, "Failed to fetch latest rates: {e}");
            println!(
                "{}",
                ui::style_text(
                    &format!("Could not fetch rates for {base}: {e}"),
                    ui::StyleType::Error
                )
            );
            return Ok(());
        }
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Base Currency"),
        ui::header_cell("Target Currency"),
        ui::header_cell("Exchange Rate"),
    ]);

    // Selected target first, then the rest of the quote board.
    if let Some(rate) = rates.get(target) {
        table.add_row(vec![
            Cell::new(base),
            Cell::new(target),
            ui::value_cell(format!("{rate:.4}")),
        ]);
    }
    for (code, rate) in &rates {
        if code != base && code != target {
            table.add_row(vec![
                Cell::new(base),
                Cell::new(code),
                ui::value_cell(format!("{rate:.4}")),
            ]);
        }
    }

    println!("{}", ui::style_text("Explore", ui::StyleType::Title));
    println!("{}", ui::style_text("Currency exchange rates", ui::StyleType::Subtle));
    println!("{table}");

    Ok(())
}
