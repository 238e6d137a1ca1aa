//! # User Repository
//!
//! Users are looked up by email, their business key.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use driveshare_core::{LoginMethod, User};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    username: String,
    avatar: String,
    login_method: LoginMethod,
    credentials: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            avatar: row.avatar,
            login_method: row.login_method,
            credentials: row.credentials,
            created_at: row.created_at,
        }
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user. A second user with the same email is a UniqueViolation.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(email = %user.email, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, username,
                avatar, login_method, credentials, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.avatar)
        .bind(user.login_method)
        .bind(&user.credentials)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&user.email))?;

        Ok(())
    }

    /// Gets a user by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        debug!(email = %email, "Fetching user");

        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, first_name, last_name, username,
                   avatar, login_method, credentials, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Number of registered users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = fixtures::user("renter@example.com", "rita");

        db.users().insert(&user).await.unwrap();

        let found = db.users().get_by_email("renter@example.com").await.unwrap();
        assert_eq!(found, Some(user));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = fixtures::user("renter@example.com", "rita");
        let mut second = fixtures::user("renter@example.com", "rita2");
        second.id = "u-other".to_string();

        db.users().insert(&first).await.unwrap();
        let err = db.users().insert(&second).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "users.email");
                assert_eq!(value, "renter@example.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.users().get_by_email("ghost@example.com").await.unwrap().is_none());
    }
}
