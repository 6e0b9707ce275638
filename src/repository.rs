//! Storage contract consumed by the commands.
//!
//! Every implementation keeps the persisted collection authoritative: a
//! mutation is applied to the backend first and a fresh full snapshot is
//! published to subscribers only once the backend confirmed it. Failures
//! surface once; there are no retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::Role;
use crate::model::{LiquidationError, NewTransaction, Transaction, TransactionKind};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transaction not found: {0}")]
    NotFound(Uuid),
    #[error("cannot liquidate {id}: {source}")]
    Liquidation {
        id: Uuid,
        #[source]
        source: LiquidationError,
    },
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Assigns an id, persists the record, and returns it.
    async fn create(&self, draft: NewTransaction) -> Result<Transaction, StoreError>;

    /// The only update path: marks a pending Betcris/Rusos balance as
    /// settled, stamping `at`. Rejected for General records and for
    /// records already liquidated.
    async fn liquidate(&self, id: Uuid, at: DateTime<Utc>) -> Result<Transaction, StoreError>;

    /// Irreversibly removes the record.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Full collection, ordered by date ascending.
    async fn list(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Restricted view for callers that may only see one kind.
    async fn list_by_kind(&self, kind: TransactionKind) -> Result<Vec<Transaction>, StoreError>;

    /// Ordered, restartable stream of full-collection snapshots; a new
    /// value is published after every confirmed mutation.
    fn subscribe(&self) -> watch::Receiver<Vec<Transaction>>;
}

/// Applies the viewer's visibility policy: partners only ever see Rusos
/// records, admins see everything.
pub async fn visible_transactions(
    repository: &dyn TransactionRepository,
    role: Role,
) -> Result<Vec<Transaction>, StoreError> {
    match role {
        Role::Admin => repository.list().await,
        Role::Partner => repository.list_by_kind(TransactionKind::Rusos).await,
    }
}
