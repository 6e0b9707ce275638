//! The `list` command: newest first, filterable by kind and by a
//! case-insensitive search over client and notes.

use anyhow::Result;
use comfy_table::Cell;

use crate::config::AppConfig;
use crate::model::{Transaction, TransactionKind};
use crate::repository::{self, TransactionRepository};
use crate::ui;

pub async fn run(
    repository: &dyn TransactionRepository,
    config: &AppConfig,
    kind: Option<TransactionKind>,
    search: Option<String>,
) -> Result<()> {
    let mut transactions = repository::visible_transactions(repository, config.role).await?;

    if let Some(kind) = kind {
        transactions.retain(|t| t.kind() == kind);
    }
    if let Some(term) = search {
        let term = term.to_lowercase();
        transactions.retain(|t| {
            t.client.to_lowercase().contains(&term) || t.notes.to_lowercase().contains(&term)
        });
    }
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{}", display_as_table(&transactions));
    Ok(())
}

pub fn display_as_table(transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Kind"),
        ui::header_cell("Client"),
        ui::header_cell("USDT"),
        ui::header_cell("Profit"),
        ui::header_cell("Status"),
        ui::header_cell("Settlement"),
        ui::header_cell("Id"),
    ]);

    for txn in transactions {
        table.add_row(vec![
            Cell::new(txn.date.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(txn.kind().to_string()),
            Cell::new(&txn.client),
            ui::money_cell(txn.usdt_amount),
            ui::profit_cell(txn.profit),
            Cell::new(txn.status.to_string()),
            Cell::new(settlement_label(txn)),
            Cell::new(txn.id.to_string()),
        ]);
    }

    table.to_string()
}

fn settlement_label(txn: &Transaction) -> &'static str {
    match txn.kind() {
        TransactionKind::General => "-",
        _ if txn.liquidated => "Liquidated",
        _ => "Pending",
    }
}
