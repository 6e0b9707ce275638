pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod formula;
pub mod list;
pub mod log;
pub mod manage;
pub mod model;
pub mod record;
pub mod report;
pub mod repository;
pub mod store;
pub mod ui;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::Period;
use crate::config::{AppConfig, Role};
use crate::formula::TradeInput;
use crate::model::TransactionKind;

pub enum AppCommand {
    Record {
        input: TradeInput,
        date: Option<DateTime<Utc>>,
        notes: Option<String>,
    },
    List {
        kind: Option<TransactionKind>,
        search: Option<String>,
    },
    Dashboard {
        period: Period,
    },
    Report {
        months: Option<u32>,
    },
    Liquidate {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Exchange tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let repository = store::open_repository(&config)?;

    match command {
        AppCommand::Record { input, date, notes } => {
            record::run(repository.as_ref(), input, date, notes).await
        }
        AppCommand::List { kind, search } => {
            list::run(repository.as_ref(), &config, kind, search).await
        }
        AppCommand::Dashboard { period } => {
            dashboard::run(repository.as_ref(), &config, period).await
        }
        AppCommand::Report { months } => {
            if config.role == Role::Partner {
                bail!("Reports are not available for the partner role");
            }
            report::run(repository.as_ref(), months.unwrap_or(config.report_months)).await
        }
        AppCommand::Liquidate { id } => manage::liquidate(repository.as_ref(), id).await,
        AppCommand::Delete { id } => manage::delete(repository.as_ref(), id).await,
    }
}
