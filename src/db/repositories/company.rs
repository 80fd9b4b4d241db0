//! Company info repository
//!
//! The company info is a singleton row (id = 1), seeded by migration.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::CompanyInfo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Company info repository trait
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Get the company info row
    async fn get(&self) -> Result<CompanyInfo>;

    /// Replace the company info row
    async fn update(&self, info: &CompanyInfo) -> Result<CompanyInfo>;
}

/// SQLx-based company info repository
pub struct SqlxCompanyRepository {
    pool: DynDatabasePool,
}

impl SqlxCompanyRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CompanyRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CompanyRepository for SqlxCompanyRepository {
    async fn get(&self) -> Result<CompanyInfo> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => get_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, info: &CompanyInfo) -> Result<CompanyInfo> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), info).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), info).await,
        }
    }
}

const COLUMNS: &str = "id, name, tagline, description, email, phone, address, social_links, updated_at";

// SQLite implementations

async fn get_sqlite(pool: &SqlitePool) -> Result<CompanyInfo> {
    let query = format!("SELECT {} FROM company_info WHERE id = 1", COLUMNS);
    let row = sqlx::query(&query)
        .fetch_one(pool)
        .await
        .context("Failed to get company info")?;

    row_to_company_sqlite(&row)
}

async fn update_sqlite(pool: &SqlitePool, info: &CompanyInfo) -> Result<CompanyInfo> {
    let now = Utc::now();
    let social_links =
        serde_json::to_string(&info.social_links).context("Failed to serialize social links")?;

    sqlx::query(
        r#"
        UPDATE company_info
        SET name = ?, tagline = ?, description = ?, email = ?, phone = ?, address = ?,
            social_links = ?, updated_at = ?
        WHERE id = 1
        "#,
    )
    .bind(&info.name)
    .bind(&info.tagline)
    .bind(&info.description)
    .bind(&info.email)
    .bind(&info.phone)
    .bind(&info.address)
    .bind(&social_links)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to update company info")?;

    let mut updated = info.clone();
    updated.updated_at = now;
    Ok(updated)
}

fn row_to_company_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<CompanyInfo> {
    let social_links: String = row.get("social_links");
    Ok(CompanyInfo {
        id: row.get("id"),
        name: row.get("name"),
        tagline: row.get("tagline"),
        description: row.get("description"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        social_links: serde_json::from_str(&social_links)
            .context("Failed to parse social links")?,
        updated_at: row.get("updated_at"),
    })
}

// MySQL implementations

async fn get_mysql(pool: &MySqlPool) -> Result<CompanyInfo> {
    let query = format!("SELECT {} FROM company_info WHERE id = 1", COLUMNS);
    let row = sqlx::query(&query)
        .fetch_one(pool)
        .await
        .context("Failed to get company info")?;

    row_to_company_mysql(&row)
}

async fn update_mysql(pool: &MySqlPool, info: &CompanyInfo) -> Result<CompanyInfo> {
    let now = Utc::now();
    let social_links =
        serde_json::to_string(&info.social_links).context("Failed to serialize social links")?;

    sqlx::query(
        r#"
        UPDATE company_info
        SET name = ?, tagline = ?, description = ?, email = ?, phone = ?, address = ?,
            social_links = ?, updated_at = ?
        WHERE id = 1
        "#,
    )
    .bind(&info.name)
    .bind(&info.tagline)
    .bind(&info.description)
    .bind(&info.email)
    .bind(&info.phone)
    .bind(&info.address)
    .bind(&social_links)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to update company info")?;

    let mut updated = info.clone();
    updated.updated_at = now;
    Ok(updated)
}

fn row_to_company_mysql(row: &sqlx::mysql::MySqlRow) -> Result<CompanyInfo> {
    let social_links: String = row.get("social_links");
    Ok(CompanyInfo {
        id: row.get("id"),
        name: row.get("name"),
        tagline: row.get("tagline"),
        description: row.get("description"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        social_links: serde_json::from_str(&social_links)
            .context("Failed to parse social links")?,
        updated_at: row.get("updated_at"),
    })
}
