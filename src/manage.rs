//! One-off record mutations: the liquidation transition and deletion.

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::repository::TransactionRepository;
use crate::ui::{self, StyleType};

pub async fn liquidate(repository: &dyn TransactionRepository, id: Uuid) -> Result<()> {
    let txn = repository.liquidate(id, Utc::now()).await?;
    info!(id = %id, "Transaction liquidated");
    println!(
        "Marked {} transaction for {} as {}",
        txn.kind(),
        txn.client,
        ui::style_text("liquidated", StyleType::TotalValue)
    );
    Ok(())
}

pub async fn delete(repository: &dyn TransactionRepository, id: Uuid) -> Result<()> {
    repository.delete(id).await?;
    info!(id = %id, "Transaction deleted");
    println!("Deleted transaction {id}");
    Ok(())
}
