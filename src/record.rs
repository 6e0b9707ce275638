//! The `add` command: validate the typed input, run the formulas, persist,
//! and echo the computed breakdown.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::formula::TradeInput;
use crate::model::TransactionDetail;
use crate::repository::TransactionRepository;
use crate::ui::{self, StyleType};

pub async fn run(
    repository: &dyn TransactionRepository,
    input: TradeInput,
    date: Option<DateTime<Utc>>,
    notes: Option<String>,
) -> Result<()> {
    let draft = input.build(date.unwrap_or_else(Utc::now), notes.unwrap_or_default())?;
    let txn = repository.create(draft).await?;
    info!(id = %txn.id, "Transaction recorded");

    println!(
        "Recorded {} transaction for {}",
        ui::style_text(&txn.kind().to_string(), StyleType::Title),
        txn.client
    );

    let lines: Vec<(&str, f64)> = match txn.detail {
        TransactionDetail::BetcrisCollection { total_value, .. } => vec![
            ("Total value", total_value),
            ("USDT to settle", txn.usdt_amount),
            ("Profit", txn.profit),
        ],
        TransactionDetail::BetcrisPurchase { total_cost, .. } => {
            vec![("Total cost", total_cost), ("Profit", txn.profit)]
        }
        TransactionDetail::RusosMargin { total_profit, .. } => vec![
            ("Total profit", total_profit),
            ("Your share", txn.profit),
            ("Partner share", total_profit - txn.profit),
        ],
        TransactionDetail::GeneralConversion { amount_in_usd, .. } => {
            vec![("Value in USD", amount_in_usd), ("Profit", txn.profit)]
        }
    };

    for (label, amount) in lines {
        println!(
            "  {}: {}",
            ui::style_text(label, StyleType::TotalLabel),
            ui::style_text(&ui::format_currency(amount), StyleType::TotalValue)
        );
    }
    println!("  {}: {}", ui::style_text("Id", StyleType::Subtle), txn.id);

    Ok(())
}
