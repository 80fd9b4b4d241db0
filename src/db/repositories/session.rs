//! Session repository
//!
//! Database operations for admin sessions: token lookup, sliding
//! expiration updates, per-user termination, expired-session cleanup.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// List all sessions for a user, newest first
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Session>>;

    /// Update a session's expiry (sliding renewal)
    async fn set_expiry(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: i64) -> Result<()>;

    /// Delete all of a user's sessions except one (e.g. the current one)
    async fn delete_by_user_except(&self, user_id: i64, keep_id: &str) -> Result<()>;

    /// Delete expired sessions, returning the number removed
    async fn delete_expired(&self) -> Result<i64>;
}

/// SQLx-based session repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), session).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), session).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_user_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                list_by_user_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }

    async fn set_expiry(&self, id: &str, expires_at: DateTime<Utc>) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
                    .bind(expires_at)
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to update session expiry")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
                    .bind(expires_at)
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to update session expiry")?;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM sessions WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete session")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM sessions WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete session")?;
            }
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM sessions WHERE user_id = ?")
                    .bind(user_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete sessions by user")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM sessions WHERE user_id = ?")
                    .bind(user_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete sessions by user")?;
            }
        }
        Ok(())
    }

    async fn delete_by_user_except(&self, user_id: i64, keep_id: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM sessions WHERE user_id = ? AND id != ?")
                    .bind(user_id)
                    .bind(keep_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete other sessions")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM sessions WHERE user_id = ? AND id != ?")
                    .bind(user_id)
                    .bind(keep_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete other sessions")?;
            }
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<i64> {
        let now = Utc::now();
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
                .bind(now)
                .execute(self.pool.as_sqlite().unwrap())
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
                .bind(now)
                .execute(self.pool.as_mysql().unwrap())
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
        };

        Ok(affected as i64)
    }
}

const COLUMNS: &str = "id, user_id, csrf_token, ip_address, user_agent, expires_at, created_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, session: &Session) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, csrf_token, ip_address, user_agent, expires_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(session.user_id)
    .bind(&session.csrf_token)
    .bind(&session.ip_address)
    .bind(&session.user_agent)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let query = format!("SELECT {} FROM sessions WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    row.map(|r| row_to_session_sqlite(&r)).transpose()
}

async fn list_by_user_sqlite(pool: &SqlitePool, user_id: i64) -> Result<Vec<Session>> {
    let query = format!(
        "SELECT {} FROM sessions WHERE user_id = ? ORDER BY created_at DESC",
        COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list sessions")?;

    rows.iter().map(row_to_session_sqlite).collect()
}

fn row_to_session_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    Ok(Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        csrf_token: row.get("csrf_token"),
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, session: &Session) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, csrf_token, ip_address, user_agent, expires_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(session.user_id)
    .bind(&session.csrf_token)
    .bind(&session.ip_address)
    .bind(&session.user_agent)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let query = format!("SELECT {} FROM sessions WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    row.map(|r| row_to_session_mysql(&r)).transpose()
}

async fn list_by_user_mysql(pool: &MySqlPool, user_id: i64) -> Result<Vec<Session>> {
    let query = format!(
        "SELECT {} FROM sessions WHERE user_id = ? ORDER BY created_at DESC",
        COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list sessions")?;

    rows.iter().map(row_to_session_mysql).collect()
}

fn row_to_session_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Session> {
    Ok(Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        csrf_token: row.get("csrf_token"),
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    })
}
