//! Coldline Server - Main Entry Point
//!
//! Wires SQLite adapters into the application services and serves them over
//! JSON-RPC, with periodic cache/session maintenance in the background.

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use coldline_api_rpc::{RpcServer, Services};
use coldline_core::application::{
    ContactService, ImportService, LeadService, ListService, MaintenanceScheduler,
    NavigationService, SessionSyncService, TemplateService,
};
use coldline_core::port::id_provider::UuidProvider;
use coldline_core::port::time_provider::SystemTimeProvider;
use coldline_core::port::{Maintenance, TimeProvider};
use coldline_infra_sqlite::{
    create_pool, run_migrations, SqliteKeyValueStore, SqliteLeadRepository, SqliteMaintenance,
    SqliteSessionRepository,
};
use config::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging (keep the guard alive for the file writer)
    let _log_guard = logging::init_logging(&config)?;

    info!("Coldline server v{} starting...", VERSION);

    // 3. Initialize database
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data dir {}", parent.display()))?;
    }
    info!(db_path = %config.db_path.display(), "Initializing database...");

    let pool = create_pool(&config.database_url())
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let lead_repo = Arc::new(SqliteLeadRepository::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let kv_store = Arc::new(SqliteKeyValueStore::new(
        pool.clone(),
        time_provider.clone(),
    ));
    let maintenance: Arc<dyn Maintenance> =
        Arc::new(SqliteMaintenance::new(pool.clone(), time_provider.clone()));

    let templates = Arc::new(TemplateService::new(kv_store.clone()));
    let sync = Arc::new(SessionSyncService::new(
        kv_store,
        session_repo,
        time_provider.clone(),
        config.sync_config(),
    ));

    let services = Services {
        import: Arc::new(ImportService::new(
            lead_repo.clone(),
            id_provider,
            time_provider.clone(),
        )),
        lists: Arc::new(ListService::new(lead_repo.clone())),
        leads: Arc::new(LeadService::new(
            lead_repo.clone(),
            lead_repo.clone(),
            time_provider.clone(),
        )),
        navigation: Arc::new(NavigationService::new(
            lead_repo.clone(),
            lead_repo.clone(),
            sync.clone(),
            time_provider.clone(),
        )),
        sync,
        templates: templates.clone(),
        contact: Arc::new(ContactService::new(
            lead_repo.clone(),
            lead_repo,
            templates,
            time_provider.clone(),
        )),
        maintenance: maintenance.clone(),
        maintenance_config: config.maintenance_config(),
        time_provider,
    };

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_server = RpcServer::new(config.rpc.clone(), services);
    let (rpc_addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 6. Start Maintenance Scheduler
    info!("Starting maintenance scheduler...");
    let maintenance_scheduler = MaintenanceScheduler::new(
        maintenance,
        config.maintenance_config(),
        config.maintenance_interval_hours,
    );

    let maintenance_handle = tokio::spawn(async move {
        maintenance_scheduler.run().await;
    });

    info!(addr = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    maintenance_handle.abort();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
