//! Scheduled jobs runner for the rental backend.
//!
//! Two independently schedulable batch operations, meant to run once daily:
//! `notify-expiring` (threshold scan + notification dispatch) and
//! `resolve-expired` (renew-vs-expire sweep). Each exits non-zero on a
//! run-level failure so the external scheduler can alert and retry.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use rental_core::services::{ExpiryNotifier, ExpiryResolver};
use rental_infrastructure::database::connection;
use rental_infrastructure::{
    PgContractRepository, PgExpirySweepStore, PgNotificationRepository,
};
use rental_shared::config::AppConfig;

#[derive(Parser)]
#[command(name = "rental-jobs", about = "Daily batch jobs for contract lifecycle management")]
struct Cli {
    /// Override the ambient date (YYYY-MM-DD) for deterministic runs.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan for contracts expiring in 30/15/7 days and notify tenants and managers.
    NotifyExpiring,
    /// Renew or expire every active contract past its end date.
    ResolveExpired,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    rental_shared::telemetry::init_telemetry();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool =
        connection::create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database connection established.");

    match cli.command {
        Command::NotifyExpiring => {
            let contracts = Arc::new(PgContractRepository::new(pool.clone()));
            let notifications = Arc::new(PgNotificationRepository::new(pool));
            let notifier = ExpiryNotifier::new(contracts, notifications);

            match notifier.run(today).await {
                Ok(report) => {
                    info!(
                        matched = report.contracts_matched,
                        created = report.notifications_created,
                        failed = report.failed_contracts,
                        "notify-expiring finished"
                    );
                    println!(
                        "notify-expiring: {} contracts matched, {} notifications created, {} failed",
                        report.contracts_matched,
                        report.notifications_created,
                        report.failed_contracts
                    );
                }
                Err(e) => {
                    error!("notify-expiring failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::ResolveExpired => {
            let store = Arc::new(PgExpirySweepStore::new(pool));
            let resolver = ExpiryResolver::new(store);

            match resolver.run(today).await {
                Ok(report) => {
                    info!(
                        renewed = report.renewed,
                        expired = report.expired,
                        "resolve-expired finished"
                    );
                    println!(
                        "resolve-expired: {} contracts renewed, {} expired",
                        report.renewed, report.expired
                    );
                }
                Err(e) => {
                    error!("resolve-expired failed, all changes rolled back: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
