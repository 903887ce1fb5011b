//! Credential store backed by the `app_user` table.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use jotter_core::{Error, Result, User, UserRepository};

use crate::unit_of_work::{unique_conflict, PgUnitOfWork};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at_utc";

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at_utc")?,
    })
}

#[async_trait]
impl UserRepository for PgUnitOfWork {
    async fn insert_user(&mut self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO app_user (id, username, email, password_hash, created_at_utc)
             VALUES ($1, $2, LOWER($3), $4, $5)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(unique_conflict("Username or email already exists"))?;
        Ok(())
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM app_user WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM app_user WHERE LOWER(email) = LOWER(TRIM($1))",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_exists(&mut self, username: &str, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM app_user
                 WHERE username = $1 OR LOWER(email) = LOWER(TRIM($2))
             )",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn update_password_hash(&mut self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE app_user SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
