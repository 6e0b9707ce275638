use anyhow::Result;
use cambio::log::init_logging;
use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a new transaction
    Add {
        #[command(subcommand)]
        deal: AddCommands,
    },
    /// List recorded transactions
    List {
        /// Only show this transaction kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Case-insensitive search over client and notes
        #[arg(long)]
        search: Option<String>,
    },
    /// Display totals and recent activity
    Dashboard {
        #[arg(long, value_enum, default_value = "month")]
        period: PeriodArg,
    },
    /// Display monthly profit and per-kind distribution
    Report {
        /// Trailing months to include (defaults to the configured value)
        #[arg(long)]
        months: Option<u32>,
    },
    /// Mark a pending Betcris/Rusos balance as settled
    Liquidate { id: Uuid },
    /// Remove a transaction permanently
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum AddCommands {
    /// Betcris collection: local + USD intake settled at a 3% margin
    BetcrisCollection {
        /// Collecting office (defaults to "Betcris")
        #[arg(long)]
        office: Option<String>,
        /// Amount collected in local currency
        #[arg(long, default_value_t = 0.0)]
        local: f64,
        /// Amount collected already in USD
        #[arg(long, default_value_t = 0.0)]
        usd: f64,
        /// Local units per USD
        #[arg(long)]
        rate: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Betcris purchase: USDT bought at a percentage surcharge
    BetcrisPurchase {
        #[arg(long)]
        office: Option<String>,
        /// USDT purchased
        #[arg(long)]
        usdt: f64,
        /// Surcharge percentage over face value
        #[arg(long)]
        percent: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Rusos margin deal, split 50/50 with the partner
    Rusos {
        #[arg(long)]
        client: Option<String>,
        /// USDT moved in the deal
        #[arg(long)]
        usdt: f64,
        /// Margin percentage on the amount
        #[arg(long)]
        margin: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// General buy or sell conversion
    General {
        #[arg(long)]
        client: Option<String>,
        #[arg(long, value_enum)]
        operation: OperationArg,
        /// USDT side of the conversion
        #[arg(long)]
        usdt: f64,
        /// Currency the counterpart amount is quoted in
        #[arg(long, value_enum, default_value = "usd")]
        currency: CurrencyArg,
        /// Counterpart amount
        #[arg(long)]
        amount: f64,
        /// Local units per USD, required for local-currency quotes
        #[arg(long, default_value_t = 0.0)]
        rate: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Transaction date, RFC 3339 (defaults to now)
    #[arg(long)]
    date: Option<DateTime<Utc>>,
    /// Free-text notes
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Betcris,
    Rusos,
    General,
}

impl From<KindArg> for cambio::model::TransactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Betcris => cambio::model::TransactionKind::Betcris,
            KindArg::Rusos => cambio::model::TransactionKind::Rusos,
            KindArg::General => cambio::model::TransactionKind::General,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Today,
    Week,
    Month,
    Year,
    All,
}

impl From<PeriodArg> for cambio::aggregate::Period {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Today => cambio::aggregate::Period::Today,
            PeriodArg::Week => cambio::aggregate::Period::Week,
            PeriodArg::Month => cambio::aggregate::Period::Month,
            PeriodArg::Year => cambio::aggregate::Period::Year,
            PeriodArg::All => cambio::aggregate::Period::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OperationArg {
    Buy,
    Sell,
}

impl From<OperationArg> for cambio::model::GeneralOperation {
    fn from(operation: OperationArg) -> Self {
        match operation {
            OperationArg::Buy => cambio::model::GeneralOperation::Buy,
            OperationArg::Sell => cambio::model::GeneralOperation::Sell,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CurrencyArg {
    Usd,
    Local,
}

impl From<CurrencyArg> for cambio::model::QuoteCurrency {
    fn from(currency: CurrencyArg) -> Self {
        match currency {
            CurrencyArg::Usd => cambio::model::QuoteCurrency::Usd,
            CurrencyArg::Local => cambio::model::QuoteCurrency::Local,
        }
    }
}

impl From<Commands> for cambio::AppCommand {
    fn from(cmd: Commands) -> cambio::AppCommand {
        match cmd {
            Commands::Add { deal } => {
                let (input, common) = match deal {
                    AddCommands::BetcrisCollection {
                        office,
                        local,
                        usd,
                        rate,
                        common,
                    } => (
                        cambio::formula::TradeInput::BetcrisCollection {
                            office,
                            local_amount: local,
                            usd_amount: usd,
                            rate,
                        },
                        common,
                    ),
                    AddCommands::BetcrisPurchase {
                        office,
                        usdt,
                        percent,
                        common,
                    } => (
                        cambio::formula::TradeInput::BetcrisPurchase {
                            office,
                            usdt_amount: usdt,
                            cost_percent: percent,
                        },
                        common,
                    ),
                    AddCommands::Rusos {
                        client,
                        usdt,
                        margin,
                        common,
                    } => (
                        cambio::formula::TradeInput::Rusos {
                            client,
                            usdt_amount: usdt,
                            margin_percent: margin,
                        },
                        common,
                    ),
                    AddCommands::General {
                        client,
                        operation,
                        usdt,
                        currency,
                        amount,
                        rate,
                        common,
                    } => (
                        cambio::formula::TradeInput::General {
                            client,
                            operation: operation.into(),
                            usdt_amount: usdt,
                            quote_currency: currency.into(),
                            quote_amount: amount,
                            rate,
                        },
                        common,
                    ),
                };
                cambio::AppCommand::Record {
                    input,
                    date: common.date,
                    notes: common.notes,
                }
            }
            Commands::List { kind, search } => cambio::AppCommand::List {
                kind: kind.map(Into::into),
                search,
            },
            Commands::Dashboard { period } => cambio::AppCommand::Dashboard {
                period: period.into(),
            },
            Commands::Report { months } => cambio::AppCommand::Report { months },
            Commands::Liquidate { id } => cambio::AppCommand::Liquidate { id },
            Commands::Delete { id } => cambio::AppCommand::Delete { id },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => cambio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = cambio::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# Where transactions are kept: disk (default) or memory.
storage:
  backend: disk
  # path: /custom/location

# admin sees everything; partner only sees Rusos deals.
role: admin

report_months: 12
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
