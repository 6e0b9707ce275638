use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile store, useful for dry runs and tests.
    Memory,
    /// Embedded keyspace under the data directory (or `storage.path`).
    Disk,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Disk
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: default_backend(),
            path: None,
        }
    }
}

/// Who is looking at the books. Partners get a restricted view: only
/// Rusos records, and no reports.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Partner,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_role")]
    pub role: Role,
    /// Trailing months shown by the report command.
    #[serde(default = "default_report_months")]
    pub report_months: u32,
}

fn default_role() -> Role {
    Role::Admin
}

fn default_report_months() -> u32 {
    12
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            storage: StorageConfig::default(),
            role: default_role(),
            report_months: default_report_months(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Where the disk backend lives when `storage.path` is not set.
    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.data_dir().join("transactions"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("do", "cambio", "cambio").context("Could not determine project directories")
}
