//! payroll-engine server entry point.
//!
//! Loads the YAML configuration, opens the SQLite database and serves the payroll API.
//! The configuration path is the first argument, then `PAYROLL_CONFIG`, then
//! `config/payroll.yaml`.

use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::processor::PayrollProcessor;
use payroll_engine::store::SqlitePayrollStore;

const DEFAULT_CONFIG_PATH: &str = "config/payroll.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PAYROLL_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ConfigLoader::load(&config_path)?.into_config();
    tracing::info!(
        config = %config_path,
        database = %config.database.path.display(),
        tax_rate = %config.tax_rate,
        "starting payroll-engine"
    );

    let store = SqlitePayrollStore::from_config(&config.database)?;
    let listen_addr = config.server.listen_addr;
    let app = create_router(AppState::new(PayrollProcessor::new(store, config)?));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
