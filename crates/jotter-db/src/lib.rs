//! # jotter-db
//!
//! PostgreSQL storage layer for jotter.
//!
//! This crate provides:
//! - Connection pool management
//! - A transaction-backed [`UnitOfWork`](jotter_core::UnitOfWork) implementing
//!   every storage trait from `jotter-core`
//! - Embedded migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use jotter_db::{Database, PoolConfig, Store};
//!
//! let db = Database::connect_with_config("postgres://localhost/jotter", PoolConfig::new()).await?;
//! db.migrate().await?;
//!
//! let mut uow = db.begin().await?;
//! uow.revoke("some-token", chrono::Utc::now()).await?;
//! uow.commit().await?;
//! ```

pub mod notes;
pub mod pool;
pub mod revocations;
pub mod tags;
pub mod unit_of_work;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use jotter_core::*;

pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};
pub use unit_of_work::PgUnitOfWork;

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self { pool }
    }

    /// Connect with the given pool sizing.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        tracing::info!(
            subsystem = "database",
            op = "migrate",
            "Database migrations applied"
        );
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
