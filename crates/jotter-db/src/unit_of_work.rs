//! Transaction-backed unit of work.
//!
//! `PgUnitOfWork` owns one `sqlx::Transaction`. Every repository method on it
//! runs inside that transaction; `commit` ends it, and dropping the unit of
//! work rolls it back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use jotter_core::{Error, Result, Store, UnitOfWork};

use crate::Database;

/// One open transaction exposing every repository.
pub struct PgUnitOfWork {
    pub(crate) tx: Transaction<'static, Postgres>,
}

impl PgUnitOfWork {
    pub async fn begin(pool: &PgPool) -> Result<Self> {
        let tx = pool.begin().await.map_err(Error::Database)?;
        Ok(Self { tx })
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(Error::Database)?;
        debug!(subsystem = "database", component = "uow", "Transaction committed");
        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(PgUnitOfWork::begin(&self.pool).await?))
    }
}

/// Map a unique-constraint violation to `Conflict(message)`; anything else
/// stays a database error.
pub(crate) fn unique_conflict(message: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Conflict(message.to_string())
        }
        _ => Error::Database(e),
    }
}
