use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use finstat_core::{list_entities, Chart, Transaction};
use finstat_ingest::parse_csv_path;
use finstat_reports::{
    ar_aging, balance_sheet, cash_flow, dso, profit_loss, revenue_variance, revenue_ytd,
    top_revenue, trailing_revenue, weekend_postings,
};

mod chat;
mod config;
mod fx;
mod llm;

#[derive(Parser, Debug)]
#[command(name = "finstat", version, about = "Financial statements and KPIs from ledger CSVs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate balance sheet, profit & loss, and cash flow statements
    Statements {
        /// Transaction CSV (columns: date, account, amount, type[, entity])
        #[arg(long)]
        csv: PathBuf,

        /// Balance sheet as-of date (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Operational KPIs
    Kpi {
        #[command(subcommand)]
        command: KpiCommand,
    },

    /// List the unique entities present in a CSV
    Entities {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Foreign exchange rates and conversion
    Fx {
        #[command(subcommand)]
        command: FxCommand,
    },

    /// Interactive Q&A over a transaction CSV
    Chat {
        /// Optional transaction CSV to ground answers in
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum KpiCommand {
    /// Accounts receivable aging buckets
    ArAging {
        #[arg(long)]
        csv: PathBuf,
        /// Reference date (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long)]
        entity: Option<String>,
    },

    /// Days sales outstanding
    Dso {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 30)]
        period_days: u64,
        #[arg(long)]
        entity: Option<String>,
    },

    /// Year-to-date revenue with monthly breakdown
    RevenueYtd {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        entity: Option<String>,
    },

    /// Current vs previous month revenue
    RevenueVariance {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        entity: Option<String>,
    },

    /// Trailing 90-day revenue
    Trailing {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        entity: Option<String>,
    },

    /// Largest revenue transactions
    Top {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        n: usize,
        #[arg(long)]
        entity: Option<String>,
    },

    /// Weekend-posted transactions
    Unusual {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        entity: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum FxCommand {
    /// Current or historical rates for a base currency
    Rates {
        #[arg(long, default_value = "USD")]
        base: String,
        /// Historical date (YYYY-MM-DD); omit for current rates
        #[arg(long)]
        date: Option<String>,
    },

    /// Convert an amount between currencies
    Convert {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        date: Option<String>,
    },
}

fn load_transactions(csv: &Path) -> Result<Vec<Transaction>> {
    let raw = parse_csv_path(csv).with_context(|| format!("parsing {}", csv.display()))?;
    Ok(Transaction::from_raw_batch(&raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct StatementsOut<'a> {
    balance_sheet: &'a finstat_reports::BalanceSheet,
    profit_loss: &'a finstat_reports::ProfitLoss,
    cash_flow: &'a finstat_reports::CashFlow,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let chart = Chart::default();
    let today = Local::now().date_naive();

    match cli.command {
        Command::Statements { csv, as_of } => {
            let txns = load_transactions(&csv)?;
            let bs = balance_sheet(&txns, &chart, as_of.unwrap_or(today));
            let pl = profit_loss(&txns, &chart);
            let cf = cash_flow(&txns, &chart);
            print_json(&StatementsOut {
                balance_sheet: &bs,
                profit_loss: &pl,
                cash_flow: &cf,
            })?;
        }

        Command::Kpi { command } => match command {
            KpiCommand::ArAging { csv, as_of, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&ar_aging(&txns, &chart, as_of.unwrap_or(today), entity.as_deref()))?;
            }
            KpiCommand::Dso { csv, period_days, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&dso(&txns, &chart, period_days, entity.as_deref()))?;
            }
            KpiCommand::RevenueYtd { csv, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&revenue_ytd(&txns, &chart, entity.as_deref(), today))?;
            }
            KpiCommand::RevenueVariance { csv, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&revenue_variance(&txns, &chart, entity.as_deref(), today))?;
            }
            KpiCommand::Trailing { csv, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&trailing_revenue(&txns, &chart, entity.as_deref(), today))?;
            }
            KpiCommand::Top { csv, n, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&top_revenue(&txns, &chart, entity.as_deref(), n))?;
            }
            KpiCommand::Unusual { csv, entity } => {
                let txns = load_transactions(&csv)?;
                print_json(&weekend_postings(&txns, entity.as_deref()))?;
            }
        },

        Command::Entities { csv } => {
            let txns = load_transactions(&csv)?;
            print_json(&list_entities(&txns))?;
        }

        Command::Fx { command } => match command {
            FxCommand::Rates { base, date } => match date {
                Some(d) => print_json(&fx::historical_rates(&base, &d, today).await)?,
                None => print_json(&fx::current_rates(&base, today).await)?,
            },
            FxCommand::Convert { amount, from, to, date } => {
                print_json(&fx::convert(amount, &from, &to, date.as_deref(), today).await?)?;
            }
        },

        Command::Chat { csv } => {
            let txns = match csv {
                Some(path) => load_transactions(&path)?,
                None => Vec::new(),
            };
            chat::run_chat(&txns, &chart).await?;
        }
    }

    Ok(())
}
