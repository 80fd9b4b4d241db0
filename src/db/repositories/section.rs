//! Page section repository
//!
//! Sections (hero, footer) are keyed JSON documents with an upsert-based
//! write path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;

/// A stored section document
#[derive(Debug, Clone)]
pub struct Section {
    pub key: String,
    /// JSON document
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for section operations
#[async_trait]
pub trait SectionRepository: Send + Sync {
    /// Get a section by key
    async fn get(&self, key: &str) -> Result<Option<Section>>;

    /// Upsert a section document
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// SQLx-based section repository
pub struct SqlxSectionRepository {
    pool: DynDatabasePool,
}

impl SqlxSectionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SectionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SectionRepository for SqlxSectionRepository {
    async fn get(&self, key: &str) -> Result<Option<Section>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(self.pool.as_sqlite().unwrap(), key).await,
            DatabaseDriver::Mysql => get_mysql(self.pool.as_mysql().unwrap(), key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => set_sqlite(self.pool.as_sqlite().unwrap(), key, value).await,
            DatabaseDriver::Mysql => set_mysql(self.pool.as_mysql().unwrap(), key, value).await,
        }
    }
}

// SQLite implementations

async fn get_sqlite(pool: &SqlitePool, key: &str) -> Result<Option<Section>> {
    let row = sqlx::query("SELECT key, value, updated_at FROM sections WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get section")?;

    Ok(row.map(|r| Section {
        key: r.get("key"),
        value: r.get("value"),
        updated_at: r.get("updated_at"),
    }))
}

async fn set_sqlite(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO sections (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .context("Failed to set section")?;
    Ok(())
}

// MySQL implementations

async fn get_mysql(pool: &MySqlPool, key: &str) -> Result<Option<Section>> {
    let row = sqlx::query("SELECT `key`, value, updated_at FROM sections WHERE `key` = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .context("Failed to get section")?;

    Ok(row.map(|r| Section {
        key: r.get("key"),
        value: r.get("value"),
        updated_at: r.get("updated_at"),
    }))
}

async fn set_mysql(pool: &MySqlPool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO sections (`key`, value) VALUES (?, ?)
         ON DUPLICATE KEY UPDATE value = VALUES(value)",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .context("Failed to set section")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxSectionRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxSectionRepository::new(pool)
    }

    #[tokio::test]
    async fn test_seeded_sections_exist() {
        let repo = setup_test_repo().await;

        let hero = repo.get("hero").await.expect("get failed");
        assert!(hero.is_some());
        assert_eq!(hero.unwrap().value, "{}");

        assert!(repo.get("footer").await.expect("get failed").is_some());
    }

    #[tokio::test]
    async fn test_get_unknown_key_returns_none() {
        let repo = setup_test_repo().await;
        assert!(repo.get("sidebar").await.expect("get failed").is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let repo = setup_test_repo().await;

        repo.set("hero", r#"{"title": "Learn Rust"}"#)
            .await
            .expect("set failed");

        let hero = repo
            .get("hero")
            .await
            .expect("get failed")
            .expect("hero missing");
        assert_eq!(hero.value, r#"{"title": "Learn Rust"}"#);
    }
}
