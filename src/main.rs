//! PointPay wallet service entry point
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌──────────┐    ┌─────────┐
//! │  Config  │───▶│  Stores    │───▶│  Ledger  │───▶│ Gateway │
//! │  (YAML)  │    │ (mem / pg) │    │          │    │ (axum)  │
//! └──────────┘    └────────────┘    └──────────┘    └─────────┘
//! ```
//!
//! With `postgres_url` configured the account store and transaction log
//! are PostgreSQL-backed; without it the service runs on in-memory
//! stores, which is enough for development and demos.

use std::sync::Arc;

use pointpay::account::{AccountStore, Database, MemoryAccountStore, PgAccountStore};
use pointpay::config::AppConfig;
use pointpay::gateway::{self, AppState};
use pointpay::txlog::{MemoryTransactionLog, PgTransactionLog, TransactionLog};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = pointpay::logging::init_logging(&config);

    tracing::info!("Starting PointPay wallet service in {} mode", env);

    let (accounts, txlog): (Arc<dyn AccountStore>, Arc<dyn TransactionLog>) =
        match &config.postgres_url {
            Some(url) => {
                let db = Database::connect(url).await?;
                db.init_schema().await?;
                (
                    Arc::new(PgAccountStore::new(db.pool().clone())),
                    Arc::new(PgTransactionLog::new(db.pool().clone())),
                )
            }
            None => {
                tracing::warn!("No postgres_url configured; using in-memory stores");
                (
                    Arc::new(MemoryAccountStore::new()),
                    Arc::new(MemoryTransactionLog::new()),
                )
            }
        };

    let state = Arc::new(AppState::new(accounts, txlog, config.onboarding.clone()));

    let port = get_port_override().unwrap_or(config.gateway.port);
    gateway::run_gateway(state, &config.gateway.host, port).await
}
