//! Testimonial repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Testimonial;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn create(&self, testimonial: &Testimonial) -> Result<Testimonial>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Testimonial>>;
    /// List testimonials ordered by display_order; optionally published only
    async fn list(&self, published_only: bool) -> Result<Vec<Testimonial>>;
    async fn update(&self, testimonial: &Testimonial) -> Result<Testimonial>;
    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct SqlxTestimonialRepository {
    pool: DynDatabasePool,
}

impl SqlxTestimonialRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TestimonialRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TestimonialRepository for SqlxTestimonialRepository {
    async fn create(&self, testimonial: &Testimonial) -> Result<Testimonial> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), testimonial).await
            }
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), testimonial).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Testimonial>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Testimonial>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), published_only).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), published_only).await
            }
        }
    }

    async fn update(&self, testimonial: &Testimonial) -> Result<Testimonial> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_sqlite(self.pool.as_sqlite().unwrap(), testimonial).await
            }
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), testimonial).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM testimonials WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete testimonial")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM testimonials WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete testimonial")?;
            }
        }
        Ok(())
    }
}

const COLUMNS: &str = "id, author, company, quote, rating, published, display_order, created_at";

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, t: &Testimonial) -> Result<Testimonial> {
    let result = sqlx::query(
        r#"
        INSERT INTO testimonials (author, company, quote, rating, published, display_order, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&t.author)
    .bind(&t.company)
    .bind(&t.quote)
    .bind(t.rating)
    .bind(t.published)
    .bind(t.display_order)
    .bind(t.created_at)
    .execute(pool)
    .await
    .context("Failed to create testimonial")?;

    let mut created = t.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Testimonial>> {
    let query = format!("SELECT {} FROM testimonials WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get testimonial")?;

    row.map(|r| row_to_testimonial_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Testimonial>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM testimonials WHERE published = 1 ORDER BY display_order, id",
            COLUMNS
        )
    } else {
        format!(
            "SELECT {} FROM testimonials ORDER BY display_order, id",
            COLUMNS
        )
    };
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list testimonials")?;

    rows.iter().map(row_to_testimonial_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, t: &Testimonial) -> Result<Testimonial> {
    sqlx::query(
        r#"
        UPDATE testimonials
        SET author = ?, company = ?, quote = ?, rating = ?, published = ?, display_order = ?
        WHERE id = ?
        "#,
    )
    .bind(&t.author)
    .bind(&t.company)
    .bind(&t.quote)
    .bind(t.rating)
    .bind(t.published)
    .bind(t.display_order)
    .bind(t.id)
    .execute(pool)
    .await
    .context("Failed to update testimonial")?;

    Ok(t.clone())
}

fn row_to_testimonial_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Testimonial> {
    Ok(Testimonial {
        id: row.get("id"),
        author: row.get("author"),
        company: row.get("company"),
        quote: row.get("quote"),
        rating: row.get("rating"),
        published: row.get::<i64, _>("published") != 0,
        display_order: row.get("display_order"),
        created_at: row.get("created_at"),
    })
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, t: &Testimonial) -> Result<Testimonial> {
    let result = sqlx::query(
        r#"
        INSERT INTO testimonials (author, company, quote, rating, published, display_order, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&t.author)
    .bind(&t.company)
    .bind(&t.quote)
    .bind(t.rating)
    .bind(t.published)
    .bind(t.display_order)
    .bind(t.created_at)
    .execute(pool)
    .await
    .context("Failed to create testimonial")?;

    let mut created = t.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Testimonial>> {
    let query = format!("SELECT {} FROM testimonials WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get testimonial")?;

    row.map(|r| row_to_testimonial_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Testimonial>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM testimonials WHERE published = 1 ORDER BY display_order, id",
            COLUMNS
        )
    } else {
        format!(
            "SELECT {} FROM testimonials ORDER BY display_order, id",
            COLUMNS
        )
    };
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list testimonials")?;

    rows.iter().map(row_to_testimonial_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, t: &Testimonial) -> Result<Testimonial> {
    sqlx::query(
        r#"
        UPDATE testimonials
        SET author = ?, company = ?, quote = ?, rating = ?, published = ?, display_order = ?
        WHERE id = ?
        "#,
    )
    .bind(&t.author)
    .bind(&t.company)
    .bind(&t.quote)
    .bind(t.rating)
    .bind(t.published)
    .bind(t.display_order)
    .bind(t.id)
    .execute(pool)
    .await
    .context("Failed to update testimonial")?;

    Ok(t.clone())
}

fn row_to_testimonial_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Testimonial> {
    Ok(Testimonial {
        id: row.get("id"),
        author: row.get("author"),
        company: row.get("company"),
        quote: row.get("quote"),
        rating: row.get("rating"),
        published: row.get::<i8, _>("published") != 0,
        display_order: row.get("display_order"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Utc;

    async fn setup_test_repo() -> SqlxTestimonialRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxTestimonialRepository::new(pool)
    }

    fn test_testimonial(author: &str, published: bool) -> Testimonial {
        Testimonial {
            id: 0,
            author: author.to_string(),
            company: "Acme".to_string(),
            quote: "Excellent course.".to_string(),
            rating: Some(5),
            published,
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let repo = setup_test_repo().await;

        let mut created = repo
            .create(&test_testimonial("Dana", true))
            .await
            .expect("create failed");
        assert!(created.id > 0);

        created.rating = None;
        created.quote = "Still excellent.".to_string();
        repo.update(&created).await.expect("update failed");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("get failed")
            .expect("testimonial not found");
        assert_eq!(found.rating, None);
        assert_eq!(found.quote, "Still excellent.");

        repo.delete(created.id).await.expect("delete failed");
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_published_only() {
        let repo = setup_test_repo().await;
        repo.create(&test_testimonial("Dana", true)).await.unwrap();
        repo.create(&test_testimonial("Sam", false)).await.unwrap();

        let public = repo.list(true).await.expect("list failed");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].author, "Dana");

        let all = repo.list(false).await.expect("list failed");
        assert_eq!(all.len(), 2);
    }
}
