use bank_ledger::application::ledger::LedgerEngine;
use bank_ledger::application::reporting::ReportingEngine;
use bank_ledger::domain::movement::DateWindow;
use bank_ledger::domain::ports::{AccountStoreRef, MovementLogRef};
use bank_ledger::infrastructure::in_memory::InMemoryStore;
use bank_ledger::interfaces::csv::account_reader::AccountReader;
use bank_ledger::interfaces::csv::account_writer::AccountWriter;
use bank_ledger::interfaces::csv::movement_reader::MovementReader;
use bank_ledger::interfaces::csv::report_writer::ReportWriter;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input movements CSV file
    input: PathBuf,

    /// Account seed CSV file; rows whose account id already exists are skipped
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Customer id to report on after applying the input
    #[arg(long)]
    report: Option<Uuid>,

    /// Report window start date (inclusive), e.g. 2024-03-01
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Report window end date (inclusive)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Report shape to produce
    #[arg(long, value_enum, default_value_t = ReportMode::Detail)]
    mode: ReportMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportMode {
    Detail,
    Summary,
    Statement,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (accounts, movements) = open_stores(cli.db_path)?;
    let engine = LedgerEngine::new(accounts.clone(), movements.clone());

    if let Some(path) = cli.accounts {
        seed_accounts(&accounts, path).await?;
    }

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = MovementReader::new(file);
    let mut applied: u64 = 0;
    let mut rejected: u64 = 0;
    for request_result in reader.requests() {
        match request_result {
            Ok(request) => match engine.apply(request).await {
                Ok(_) => applied += 1,
                Err(e) => {
                    rejected += 1;
                    eprintln!("Error applying movement: {e}");
                }
            },
            Err(e) => {
                rejected += 1;
                eprintln!("Error reading movement: {e}");
            }
        }
    }
    info!(applied, rejected, "finished applying movements");

    match cli.report {
        Some(customer_id) => {
            let reports = ReportingEngine::new(accounts, movements);
            let stdout = io::stdout();
            match cli.mode {
                ReportMode::Detail => {
                    let rows = reports
                        .detail(customer_id, DateWindow::new(cli.from, cli.to))
                        .await
                        .into_diagnostic()?;
                    ReportWriter::new(stdout.lock())
                        .write_detail(&rows)
                        .into_diagnostic()?;
                }
                ReportMode::Summary => {
                    let summary = reports
                        .summary(customer_id, DateWindow::new(cli.from, cli.to))
                        .await
                        .into_diagnostic()?;
                    serde_json::to_writer_pretty(stdout.lock(), &summary).into_diagnostic()?;
                    println!();
                }
                ReportMode::Statement => {
                    let (Some(start), Some(end)) = (cli.from, cli.to) else {
                        return Err(miette!("--mode statement requires both --from and --to"));
                    };
                    let statement = reports
                        .statement(customer_id, start, end)
                        .await
                        .into_diagnostic()?;
                    serde_json::to_writer_pretty(stdout.lock(), &statement).into_diagnostic()?;
                    println!();
                }
            }
        }
        None => {
            let all = accounts.all().await.into_diagnostic()?;
            let stdout = io::stdout();
            AccountWriter::new(stdout.lock())
                .write_accounts(all)
                .into_diagnostic()?;
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(AccountStoreRef, MovementLogRef)> {
    use bank_ledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = Arc::new(RocksDBStore::open(path).into_diagnostic()?);
            Ok((store.clone(), store))
        }
        None => {
            let store = Arc::new(InMemoryStore::new());
            Ok((store.clone(), store))
        }
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(AccountStoreRef, MovementLogRef)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    let store = Arc::new(InMemoryStore::new());
    Ok((store.clone(), store))
}

/// Loads account seeds, skipping ids the store already knows so re-runs
/// against a persistent database keep their balances.
async fn seed_accounts(accounts: &AccountStoreRef, path: PathBuf) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let mut seeded: u64 = 0;
    for seed_result in AccountReader::new(file).seeds() {
        match seed_result {
            Ok(seed) => {
                if accounts.get(seed.id).await.into_diagnostic()?.is_some() {
                    continue;
                }
                match seed.into_account() {
                    Ok(account) => {
                        accounts.save(account).await.into_diagnostic()?;
                        seeded += 1;
                    }
                    Err(e) => eprintln!("Error seeding account: {e}"),
                }
            }
            Err(e) => eprintln!("Error reading account: {e}"),
        }
    }
    info!(seeded, "seeded accounts");
    Ok(())
}
