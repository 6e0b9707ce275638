//! The `report` command: trailing monthly profit series and per-kind
//! profit distribution, the CLI rendition of the two dashboard charts.

use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;

use crate::aggregate;
use crate::model::TransactionKind;
use crate::repository::TransactionRepository;
use crate::ui::{self, StyleType};

const BAR_WIDTH: usize = 30;

pub async fn run(repository: &dyn TransactionRepository, months: u32) -> Result<()> {
    let transactions = repository.list().await?;
    let now = Utc::now();

    let series = aggregate::monthly_series(&transactions, months, now);
    let max_profit = series.iter().map(|b| b.profit).fold(0.0, f64::max);

    println!(
        "{}",
        ui::style_text(&format!("Profit by month (last {months})"), StyleType::Title)
    );
    let mut monthly = ui::new_styled_table();
    monthly.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Profit"),
        ui::header_cell(""),
    ]);
    for bucket in &series {
        monthly.add_row(vec![
            Cell::new(&bucket.label),
            ui::profit_cell(bucket.profit),
            Cell::new(ui::bar(bucket.profit, max_profit, BAR_WIDTH)),
        ]);
    }
    println!("{monthly}");

    let totals = aggregate::type_distribution(&transactions);
    let overall = totals.total();

    println!();
    println!("{}", ui::style_text("Profit by kind", StyleType::Title));
    let mut distribution = ui::new_styled_table();
    distribution.set_header(vec![
        ui::header_cell("Kind"),
        ui::header_cell("Profit"),
        ui::header_cell("Share"),
    ]);
    for kind in TransactionKind::ALL {
        let profit = totals.for_kind(kind);
        let share = if overall != 0.0 {
            profit / overall * 100.0
        } else {
            0.0
        };
        distribution.add_row(vec![
            Cell::new(kind.to_string()),
            ui::profit_cell(profit),
            ui::percent_cell(share),
        ]);
    }
    println!("{distribution}");

    println!(
        "\n{}: {}",
        ui::style_text("Total profit", StyleType::TotalLabel),
        ui::style_text(&ui::format_currency(overall), StyleType::TotalValue)
    );

    Ok(())
}
