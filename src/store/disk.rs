//! Durable repository backend on a fjall keyspace. Records are keyed by
//! their uuid and stored as JSON documents in one partition.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::model::{NewTransaction, Transaction, TransactionKind};
use crate::repository::{StoreError, TransactionRepository};

const TRANSACTIONS_PARTITION: &str = "transactions";

impl From<fjall::Error> for StoreError {
    fn from(err: fjall::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub struct FjallStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    snapshots: watch::Sender<Vec<Transaction>>,
}

impl FjallStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let keyspace = fjall::Config::new(path).open()?;
        let partition =
            keyspace.open_partition(TRANSACTIONS_PARTITION, PartitionCreateOptions::default())?;

        let (snapshots, _) = watch::channel(Vec::new());
        let store = Self {
            keyspace,
            partition,
            snapshots,
        };
        // Seed subscribers with whatever is already on disk.
        let existing = store.read_all()?;
        debug!(count = existing.len(), "Opened transaction store");
        store.snapshots.send_replace(existing);
        Ok(store)
    }

    fn read_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let mut all = Vec::new();
        for entry in self.partition.iter() {
            let (_, value) = entry?;
            all.push(serde_json::from_slice(&value)?);
        }
        all.sort_by_key(|t: &Transaction| t.date);
        Ok(all)
    }

    fn get(&self, id: Uuid) -> Result<Transaction, StoreError> {
        let value = self
            .partition
            .get(id.as_bytes())?
            .ok_or(StoreError::NotFound(id))?;
        Ok(serde_json::from_slice(&value)?)
    }

    fn put(&self, txn: &Transaction) -> Result<(), StoreError> {
        self.partition
            .insert(txn.id.as_bytes(), serde_json::to_vec(txn)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn publish(&self) -> Result<(), StoreError> {
        self.snapshots.send_replace(self.read_all()?);
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for FjallStore {
    async fn create(&self, draft: NewTransaction) -> Result<Transaction, StoreError> {
        let txn = draft.into_transaction(Uuid::new_v4());
        self.put(&txn)?;
        debug!(id = %txn.id, kind = %txn.kind(), "Stored transaction");
        self.publish()?;
        Ok(txn)
    }

    async fn liquidate(&self, id: Uuid, at: DateTime<Utc>) -> Result<Transaction, StoreError> {
        let mut txn = self.get(id)?;
        txn.liquidate(at)
            .map_err(|source| StoreError::Liquidation { id, source })?;
        self.put(&txn)?;
        debug!(id = %id, "Liquidated transaction");
        self.publish()?;
        Ok(txn)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        // Surface a NotFound instead of silently removing nothing.
        self.get(id)?;
        self.partition.remove(id.as_bytes())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(id = %id, "Deleted transaction");
        self.publish()?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        self.read_all()
    }

    async fn list_by_kind(&self, kind: TransactionKind) -> Result<Vec<Transaction>, StoreError> {
        let mut all = self.read_all()?;
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
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap()
    }

    fn collection_draft(d: u32) -> NewTransaction {
        TradeInput::BetcrisCollection {
            office: Some("Central".to_string()),
            local_amount: 300000.0,
            usd_amount: 0.0,
            rate: 60.0,
        }
        .build(day(d), String::new())
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_round_trip() {
        let dir = tempdir().unwrap();
        let store = FjallStore::open(dir.path()).unwrap();

        let txn = store.create(collection_draft(3)).await.unwrap();
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], txn);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = FjallStore::open(dir.path()).unwrap();
            let txn = store.create(collection_draft(3)).await.unwrap();
            store.liquidate(txn.id, day(4)).await.unwrap();
            txn.id
        };

        let reopened = FjallStore::open(dir.path()).unwrap();
        let all = reopened.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert!(all[0].liquidated);
        assert_eq!(all[0].liquidation_date, Some(day(4)));

        // The initial snapshot already carries the persisted records.
        assert_eq!(reopened.subscribe().borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FjallStore::open(dir.path()).unwrap();

        let txn = store.create(collection_draft(1)).await.unwrap();
        store.delete(txn.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.delete(txn.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
