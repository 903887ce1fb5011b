//! jotter HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use jotter_api::config::{ServerConfig, StorageBackend};
use jotter_api::{router, telemetry, AppState};
use jotter_core::{AccountService, AuthConfig, MemoryStore, Store};
use jotter_db::{log_pool_metrics, Database, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    let _log_guard = telemetry::init_tracing(&config.log);

    let store: Arc<dyn Store> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool_config = PoolConfig::new().max_connections(config.db_max_connections);
            let db = Database::connect_with_config(&config.database_url, pool_config).await?;
            db.migrate().await?;
            log_pool_metrics(db.pool());
            Arc::new(db)
        }
        StorageBackend::Memory => {
            warn!(
                subsystem = "api",
                "Using in-memory storage; all data is lost on shutdown"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let auth_config = AuthConfig::new(config.jwt_secret_or_ephemeral());
    let accounts = AccountService::new(&auth_config)?;
    let state = AppState::new(store, accounts);

    let app = router(state, config.allowed_origins.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        subsystem = "api",
        backend = ?config.storage_backend,
        "Starting server on {}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(subsystem = "api", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(subsystem = "api", "Shutdown signal received");
}
