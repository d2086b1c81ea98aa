//! Postgres-backed user repository.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `UniqueViolation("username")` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / network / decode | N/A | `Unavailable` |
//!
//! `NotFound` is never produced by the mapping: queries use
//! `fetch_optional` and report a missing row explicitly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use rolegate_auth::{Credential, NewUser, RepositoryError, Role, User, UserRepository};
use rolegate_core::{EmailAddress, UserId, Username};

const SCHEMA: &str = include_str!("../migrations/0001_users.sql");

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password, role, \
                            is_superuser, is_active, date_joined";

/// User repository over a `users` table.
///
/// Username uniqueness is the table's `UNIQUE` constraint, so concurrent
/// inserts race inside Postgres and the loser gets SQLSTATE `23505`.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip_all, fields(%username))]
    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query(&sql)
            .bind(username.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_username", e))?;
        match row {
            Some(row) => user_from_row(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    #[instrument(skip_all, fields(%id))]
    async fn find_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        match row {
            Some(row) => user_from_row(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username), err)]
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let role = new_user.initial_role();
        let sql = format!(
            "INSERT INTO users (username, email, first_name, last_name, password, role, is_superuser, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(new_user.username.as_str())
            .bind(email_column(new_user.email.as_ref()))
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(new_user.credential.to_storage())
            .bind(role.as_str())
            .bind(new_user.is_superuser)
            .bind(new_user.is_active)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create", e))?;
        user_from_row(&row)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET email = $2, first_name = $3, last_name = $4, password = $5, \
             role = $6, is_superuser = $7, is_active = $8 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user.id.get())
            .bind(email_column(user.email.as_ref()))
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.credential.to_storage())
            .bind(user.role.as_str())
            .bind(user.is_superuser)
            .bind(user.is_active)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;
        match row {
            Some(row) => user_from_row(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    #[instrument(skip_all, fields(%id), err)]
    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;
        rows.iter().map(user_from_row).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn email_column(email: Option<&EmailAddress>) -> &str {
    email.map(EmailAddress::as_str).unwrap_or("")
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    let decode =
        |e: sqlx::Error| RepositoryError::unavailable(format!("failed to decode user row: {e}"));
    let corrupt = |e: rolegate_core::DomainError| {
        RepositoryError::unavailable(format!("stored user row is invalid: {e}"))
    };

    let id: i64 = row.try_get("id").map_err(decode)?;
    let username: String = row.try_get("username").map_err(decode)?;
    let email: String = row.try_get("email").map_err(decode)?;
    let password: String = row.try_get("password").map_err(decode)?;
    let role: String = row.try_get("role").map_err(decode)?;
    let date_joined: DateTime<Utc> = row.try_get("date_joined").map_err(decode)?;

    let email = if email.is_empty() {
        None
    } else {
        Some(EmailAddress::parse(&email).map_err(corrupt)?)
    };

    Ok(User {
        id: UserId::new(id),
        username: Username::parse(username).map_err(corrupt)?,
        email,
        first_name: row.try_get("first_name").map_err(decode)?,
        last_name: row.try_get("last_name").map_err(decode)?,
        credential: Credential::from_storage(&password),
        role: role.parse::<Role>().map_err(corrupt)?,
        is_superuser: row.try_get("is_superuser").map_err(decode)?,
        is_active: row.try_get("is_active").map_err(decode)?,
        date_joined,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                RepositoryError::UniqueViolation("username")
            } else {
                RepositoryError::unavailable(format!(
                    "database error in {}: {}",
                    operation,
                    db_err.message()
                ))
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::unavailable(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
