//! In-memory repository backend. Nothing survives the process; the point
//! is a cheap backend for tests and dry runs with identical semantics to
//! the disk store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::debug;
use uuid::Uuid;

use crate::model::{NewTransaction, Transaction, TransactionKind};
use crate::repository::{StoreError, TransactionRepository};

pub struct MemoryStore {
    inner: Mutex<HashMap<Uuid, Transaction>>,
    snapshots: watch::Sender<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            inner: Mutex::new(HashMap::new()),
            snapshots,
        }
    }

    fn publish(&self, records: &HashMap<Uuid, Transaction>) {
        let mut snapshot: Vec<Transaction> = records.values().cloned().collect();
        snapshot.sort_by_key(|t| t.date);
        self.snapshots.send_replace(snapshot);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn create(&self, draft: NewTransaction) -> Result<Transaction, StoreError> {
        let txn = draft.into_transaction(Uuid::new_v4());
        let mut records = self.inner.lock().await;
        records.insert(txn.id, txn.clone());
        debug!(id = %txn.id, kind = %txn.kind(), "Stored transaction");
        self.publish(&records);
        Ok(txn)
    }

    async fn liquidate(&self, id: Uuid, at: DateTime<Utc>) -> Result<Transaction, StoreError> {
        let mut records = self.inner.lock().await;
        let txn = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        txn.liquidate(at)
            .map_err(|source| StoreError::Liquidation { id, source })?;
        let updated = txn.clone();
        debug!(id = %id, "Liquidated transaction");
        self.publish(&records);
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.inner.lock().await;
        if records.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        debug!(id = %id, "Deleted transaction");
        self.publish(&records);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        let records = self.inner.lock().await;
        let mut all: Vec<Transaction> = records.values().cloned().collect();
        all.sort_by_key(|t| t.date);
        Ok(all)
    }

    async fn list_by_kind(&self, kind: TransactionKind) -> Result<Vec<Transaction>, StoreError> {
        let mut all = self.list().await?;
        all.retain(|t| t.kind() == kind);
        Ok(all)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Transaction>> {
        self.snapshots.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::TradeInput;
    use crate::model::GeneralOperation;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap()
    }

    fn rusos_draft(d: u32) -> NewTransaction {
        TradeInput::Rusos {
            client: None,
            usdt_amount: 10000.0,
            margin_percent: 15.0,
        }
        .build(day(d), String::new())
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_lists_by_date() {
        let store = MemoryStore::new();
        let newer = store.create(rusos_draft(20)).await.unwrap();
        let older = store.create(rusos_draft(5)).await.unwrap();
        assert_ne!(newer.id, older.id);

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, older.id);
        assert_eq!(all[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = MemoryStore::new();
        let txn = store.create(rusos_draft(1)).await.unwrap();

        store.delete(txn.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        let missing = store.delete(txn.id).await;
        assert!(matches!(missing, Err(StoreError::NotFound(id)) if id == txn.id));
    }

    #[tokio::test]
    async fn test_liquidate_once_only() {
        let store = MemoryStore::new();
        let txn = store.create(rusos_draft(1)).await.unwrap();
        let at = day(2);

        let updated = store.liquidate(txn.id, at).await.unwrap();
        assert!(updated.liquidated);
        assert_eq!(updated.liquidation_date, Some(at));

        let again = store.liquidate(txn.id, day(3)).await;
        assert!(matches!(again, Err(StoreError::Liquidation { .. })));
    }

    #[tokio::test]
    async fn test_liquidate_rejects_general() {
        let store = MemoryStore::new();
        let draft = TradeInput::General {
            client: None,
            operation: GeneralOperation::Buy,
            usdt_amount: 1000.0,
            quote_currency: crate::model::QuoteCurrency::Usd,
            quote_amount: 980.0,
            rate: 0.0,
        }
        .build(day(1), String::new())
        .unwrap();
        let txn = store.create(draft).await.unwrap();

        let refused = store.liquidate(txn.id, day(2)).await;
        assert!(matches!(refused, Err(StoreError::Liquidation { .. })));
        assert!(!store.list().await.unwrap()[0].liquidated);
    }

    #[tokio::test]
    async fn test_list_by_kind_filters() {
        let store = MemoryStore::new();
        store.create(rusos_draft(1)).await.unwrap();
        let purchase = TradeInput::BetcrisPurchase {
            office: None,
            usdt_amount: 2000.0,
            cost_percent: 3.0,
        }
        .build(day(2), String::new())
        .unwrap();
        store.create(purchase).await.unwrap();

        let rusos = store.list_by_kind(TransactionKind::Rusos).await.unwrap();
        assert_eq!(rusos.len(), 1);
        assert_eq!(rusos[0].kind(), TransactionKind::Rusos);
        let general = store.list_by_kind(TransactionKind::General).await.unwrap();
        assert!(general.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_sees_each_confirmed_mutation() {
        let store = MemoryStore::new();
        let mut updates = store.subscribe();
        assert!(updates.borrow().is_empty());

        let txn = store.create(rusos_draft(1)).await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().len(), 1);

        store.delete(txn.id).await.unwrap();
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_empty());
    }
}
