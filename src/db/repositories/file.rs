//! Stored file repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::StoredFile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, file: &StoredFile) -> Result<StoredFile>;
    async fn get_by_id(&self, id: i64) -> Result<Option<StoredFile>>;
    /// List all files, newest first
    async fn list(&self) -> Result<Vec<StoredFile>>;
    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct SqlxFileRepository {
    pool: DynDatabasePool,
}

impl SqlxFileRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn FileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FileRepository for SqlxFileRepository {
    async fn create(&self, file: &StoredFile) -> Result<StoredFile> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), file).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), file).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredFile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<StoredFile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM files WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete file record")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM files WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete file record")?;
            }
        }
        Ok(())
    }
}

const COLUMNS: &str = "id, filename, original_name, content_type, size_bytes, checksum, url, created_at";

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, file: &StoredFile) -> Result<StoredFile> {
    let result = sqlx::query(
        r#"
        INSERT INTO files (filename, original_name, content_type, size_bytes, checksum, url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&file.filename)
    .bind(&file.original_name)
    .bind(&file.content_type)
    .bind(file.size_bytes)
    .bind(&file.checksum)
    .bind(&file.url)
    .bind(file.created_at)
    .execute(pool)
    .await
    .context("Failed to create file record")?;

    let mut created = file.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<StoredFile>> {
    let query = format!("SELECT {} FROM files WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get file record")?;

    Ok(row.map(|r| row_to_file_sqlite(&r)))
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<StoredFile>> {
    let query = format!("SELECT {} FROM files ORDER BY created_at DESC, id DESC", COLUMNS);
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list file records")?;

    Ok(rows.iter().map(row_to_file_sqlite).collect())
}

fn row_to_file_sqlite(row: &sqlx::sqlite::SqliteRow) -> StoredFile {
    StoredFile {
        id: row.get("id"),
        filename: row.get("filename"),
        original_name: row.get("original_name"),
        content_type: row.get("content_type"),
        size_bytes: row.get("size_bytes"),
        checksum: row.get("checksum"),
        url: row.get("url"),
        created_at: row.get("created_at"),
    }
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, file: &StoredFile) -> Result<StoredFile> {
    let result = sqlx::query(
        r#"
        INSERT INTO files (filename, original_name, content_type, size_bytes, checksum, url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&file.filename)
    .bind(&file.original_name)
    .bind(&file.content_type)
    .bind(file.size_bytes)
    .bind(&file.checksum)
    .bind(&file.url)
    .bind(file.created_at)
    .execute(pool)
    .await
    .context("Failed to create file record")?;

    let mut created = file.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<StoredFile>> {
    let query = format!("SELECT {} FROM files WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get file record")?;

    Ok(row.map(|r| row_to_file_mysql(&r)))
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<StoredFile>> {
    let query = format!("SELECT {} FROM files ORDER BY created_at DESC, id DESC", COLUMNS);
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list file records")?;

    Ok(rows.iter().map(row_to_file_mysql).collect())
}

fn row_to_file_mysql(row: &sqlx::mysql::MySqlRow) -> StoredFile {
    StoredFile {
        id: row.get("id"),
        filename: row.get("filename"),
        original_name: row.get("original_name"),
        content_type: row.get("content_type"),
        size_bytes: row.get("size_bytes"),
        checksum: row.get("checksum"),
        url: row.get("url"),
        created_at: row.get("created_at"),
    }
}
