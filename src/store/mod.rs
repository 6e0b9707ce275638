pub mod disk;
pub mod memory;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{AppConfig, StorageBackend};
use crate::repository::TransactionRepository;

/// Opens the repository backend the configuration asks for.
pub fn open_repository(config: &AppConfig) -> Result<Arc<dyn TransactionRepository>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(memory::MemoryStore::new())),
        StorageBackend::Disk => {
            let path = match &config.storage.path {
                Some(path) => path.clone(),
                None => AppConfig::default_data_path()?,
            };
            let store = disk::FjallStore::open(&path).with_context(|| {
                format!("Failed to open transaction store at {}", path.display())
            })?;
            Ok(Arc::new(store))
        }
    }
}
