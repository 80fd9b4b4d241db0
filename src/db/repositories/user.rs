//! Admin user repository
//!
//! Database operations for administrator accounts.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::AdminUser;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Admin user repository trait
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    /// Create a new admin user
    async fn create(&self, user: &AdminUser) -> Result<AdminUser>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<AdminUser>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>>;

    /// Update an existing user
    async fn update(&self, user: &AdminUser) -> Result<AdminUser>;

    /// Count all admin users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based admin user repository
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxAdminUserRepository {
    pool: DynDatabasePool,
}

impl SqlxAdminUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AdminUserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AdminUserRepository for SqlxAdminUserRepository {
    async fn create(&self, user: &AdminUser) -> Result<AdminUser> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<AdminUser>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_column_sqlite(self.pool.as_sqlite().unwrap(), "username", username).await
            }
            DatabaseDriver::Mysql => {
                get_by_column_mysql(self.pool.as_mysql().unwrap(), "username", username).await
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_column_sqlite(self.pool.as_sqlite().unwrap(), "email", email).await
            }
            DatabaseDriver::Mysql => {
                get_by_column_mysql(self.pool.as_mysql().unwrap(), "email", email).await
            }
        }
    }

    async fn update(&self, user: &AdminUser) -> Result<AdminUser> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
                    .fetch_one(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to count admin users")?;
                Ok(count)
            }
            DatabaseDriver::Mysql => {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
                    .fetch_one(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to count admin users")?;
                Ok(count)
            }
        }
    }
}

const COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, user: &AdminUser) -> Result<AdminUser> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_users (username, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create admin user")?;

    let mut created = user.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<AdminUser>> {
    let query = format!("SELECT {} FROM admin_users WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get admin user")?;

    row.map(|r| row_to_user_sqlite(&r)).transpose()
}

async fn get_by_column_sqlite(
    pool: &SqlitePool,
    column: &str,
    value: &str,
) -> Result<Option<AdminUser>> {
    // `column` is a compile-time constant at every call site, never user input
    let query = format!("SELECT {} FROM admin_users WHERE {} = ?", COLUMNS, column);
    let row = sqlx::query(&query)
        .bind(value)
        .fetch_optional(pool)
        .await
        .context("Failed to get admin user")?;

    row.map(|r| row_to_user_sqlite(&r)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, user: &AdminUser) -> Result<AdminUser> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE admin_users
        SET username = ?, email = ?, password_hash = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(now)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update admin user")?;

    let mut updated = user.clone();
    updated.updated_at = now;
    Ok(updated)
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<AdminUser> {
    Ok(AdminUser {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, user: &AdminUser) -> Result<AdminUser> {
    let result = sqlx::query(
        r#"
        INSERT INTO admin_users (username, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create admin user")?;

    let mut created = user.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<AdminUser>> {
    let query = format!("SELECT {} FROM admin_users WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get admin user")?;

    row.map(|r| row_to_user_mysql(&r)).transpose()
}

async fn get_by_column_mysql(
    pool: &MySqlPool,
    column: &str,
    value: &str,
) -> Result<Option<AdminUser>> {
    let query = format!("SELECT {} FROM admin_users WHERE {} = ?", COLUMNS, column);
    let row = sqlx::query(&query)
        .bind(value)
        .fetch_optional(pool)
        .await
        .context("Failed to get admin user")?;

    row.map(|r| row_to_user_mysql(&r)).transpose()
}

async fn update_mysql(pool: &MySqlPool, user: &AdminUser) -> Result<AdminUser> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE admin_users
        SET username = ?, email = ?, password_hash = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(now)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update admin user")?;

    let mut updated = user.clone();
    updated.updated_at = now;
    Ok(updated)
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<AdminUser> {
    Ok(AdminUser {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxAdminUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxAdminUserRepository::new(pool)
    }

    fn test_user(name: &str) -> AdminUser {
        AdminUser::new(
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let repo = setup_test_repo().await;

        let created = repo.create(&test_user("admin")).await.expect("create failed");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("get failed")
            .expect("user not found");
        assert_eq!(found.username, "admin");
        assert_eq!(found.email, "admin@example.com");
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("admin")).await.expect("create failed");

        assert!(repo
            .get_by_username("admin")
            .await
            .expect("get failed")
            .is_some());
        assert!(repo
            .get_by_email("admin@example.com")
            .await
            .expect("get failed")
            .is_some());
        assert!(repo
            .get_by_username("nobody")
            .await
            .expect("get failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("admin")).await.expect("create failed");

        let mut dup = test_user("admin");
        dup.email = "other@example.com".to_string();
        assert!(repo.create(&dup).await.is_err());
    }

    #[tokio::test]
    async fn test_update() {
        let repo = setup_test_repo().await;
        let mut user = repo.create(&test_user("admin")).await.expect("create failed");

        user.email = "new@example.com".to_string();
        let updated = repo.update(&user).await.expect("update failed");
        assert_eq!(updated.email, "new@example.com");

        let found = repo
            .get_by_id(user.id)
            .await
            .expect("get failed")
            .expect("user not found");
        assert_eq!(found.email, "new@example.com");
    }

    #[tokio::test]
    async fn test_count() {
        let repo = setup_test_repo().await;
        assert_eq!(repo.count().await.expect("count failed"), 0);

        repo.create(&test_user("admin")).await.expect("create failed");
        assert_eq!(repo.count().await.expect("count failed"), 1);
    }
}
