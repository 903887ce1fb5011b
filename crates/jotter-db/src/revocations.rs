//! Revocation ledger backed by the `revoked_token` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use jotter_core::{Error, Result, RevocationLedger, RevokeOutcome};

use crate::unit_of_work::PgUnitOfWork;

#[async_trait]
impl RevocationLedger for PgUnitOfWork {
    async fn revoke(&mut self, token: &str, at: DateTime<Utc>) -> Result<RevokeOutcome> {
        let result = sqlx::query(
            "INSERT INTO revoked_token (token, revoked_at_utc) VALUES ($1, $2)
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .bind(at)
        .execute(&mut *self.tx)
        .await
        .map_err(Error::Database)?;

        Ok(if result.rows_affected() > 0 {
            RevokeOutcome::Revoked
        } else {
            RevokeOutcome::AlreadyRevoked
        })
    }

    async fn is_revoked(&mut self, token: &str) -> Result<bool> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_token WHERE token = $1)")
                .bind(token)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(Error::Database)?;
        Ok(revoked)
    }
}
