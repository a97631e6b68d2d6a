//! Historical rate chart for a currency pair.

use super::ui;
use crate::core::clock::Clock;
use crate::core::rates::{RateProvider, RateSeries, SeriesWindow, fetch_series};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    provider: &dyn RateProvider,
    clock: &dyn Clock,
    from: &str,
    to: &str,
    window: SeriesWindow,
) -> Result<()> {
    // One HTTP call per calendar step; the bar makes the sequential
    // fan-out visible instead of hiding a multi-second fetch.
    let pb = ui::new_progress_bar(window.step_count(), true);
    pb.set_message(format!("Fetching {window} rates..."));

    let pb_clone = pb.clone();
    let series = fetch_series(provider, from, to, window, clock.today(), |_| {
        pb_clone.inc(1);
    })
    .await;
    pb.finish_and_clear();

    if series.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("No {window} history available for {from}/{to}"),
                ui::StyleType::Error
            )
        );
        return Ok(());
    }

    println!(
        "{}",
        ui::style_text(&format!("{from} / {to} ({window})"), ui::StyleType::Title)
    );
    println!("{}", render_table(&series));

    let latest = series.last().map(|p| p.rate);
    print!(
        "{} ",
        ui::style_text(
            &format!("Latest: {:.4}", latest.unwrap_or(0.0)),
            ui::StyleType::TotalValue
        )
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "(min {:.4}, max {:.4} over {} points)",
                series.min_rate().unwrap_or(0.0),
                series.max_rate().unwrap_or(0.0),
                series.len()
            ),
            ui::StyleType::Subtle
        )
    );

    Ok(())
}

pub fn render_table(series: &RateSeries) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Rate"),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<f64> = None;
    for point in series.points() {
        let change = previous.map(|prev| point.rate - prev);
        table.add_row(vec![
            Cell::new(point.date.to_string()),
            ui::value_cell(format!("{:.4}", point.rate)),
            change.map_or(Cell::new(""), ui::change_cell),
        ]);
        previous = Some(point.rate);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RatePoint;
    use chrono::NaiveDate;

    #[test]
    fn test_render_table_lists_every_point() {
        let mut series = RateSeries::new();
        for (day, rate) in [(1, 1.10), (2, 1.15), (3, 1.08)] {
            series.push(RatePoint {
                date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                rate,
            });
        }

        let rendered = render_table(&series);
        assert!(rendered.contains("2024-03-01"));
        assert!(rendered.contains("2024-03-03"));
        assert!(rendered.contains("1.1000"));
        // Change column shows signed deltas from the second row on.
        assert!(rendered.contains("+0.0500"));
        assert!(rendered.contains("-0.0700"));
    }
}
