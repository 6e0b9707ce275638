//! The `dashboard` command: headline figures for the selected period plus
//! the most recent activity.

use anyhow::Result;
use chrono::Utc;

use crate::aggregate::{self, Period};
use crate::config::AppConfig;
use crate::list;
use crate::repository::{self, TransactionRepository};
use crate::ui::{self, StyleType};

const RECENT_COUNT: usize = 5;

pub async fn run(
    repository: &dyn TransactionRepository,
    config: &AppConfig,
    period: Period,
) -> Result<()> {
    let transactions = repository::visible_transactions(repository, config.role).await?;
    let filtered = aggregate::filter_by_period(&transactions, period, Utc::now());
    let stats = aggregate::summarize(&filtered);

    println!("{}", ui::style_text("Dashboard", StyleType::Title));
    println!(
        "  {}: {}",
        ui::style_text("Balance (USDT)", StyleType::TotalLabel),
        ui::style_text(&ui::format_currency(stats.total_usdt), StyleType::TotalValue)
    );
    println!(
        "  {}: {}",
        ui::style_text("Profit", StyleType::TotalLabel),
        ui::style_text(&ui::format_currency(stats.total_profit), StyleType::TotalValue)
    );
    println!(
        "  {}: {}",
        ui::style_text("Transactions", StyleType::TotalLabel),
        stats.count
    );
    println!(
        "  {}: {:.2}%",
        ui::style_text("Average margin", StyleType::TotalLabel),
        stats.avg_margin_pct
    );

    // Recent activity is drawn from the whole collection, not the period.
    let mut recent = transactions;
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_COUNT);

    if !recent.is_empty() {
        ui::print_separator();
        println!("{}", ui::style_text("Recent transactions", StyleType::Title));
        println!("{}", list::display_as_table(&recent));
    }

    Ok(())
}
