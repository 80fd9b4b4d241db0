//! Course repository
//!
//! Database operations for courses and their features. Features always
//! belong to a course and cascade on delete.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Course, CourseFeature};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Course repository trait
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Create a new course
    async fn create(&self, course: &Course) -> Result<Course>;

    /// Get course by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Course>>;

    /// Get course by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Course>>;

    /// List courses ordered by display_order; optionally published only
    async fn list(&self, published_only: bool) -> Result<Vec<Course>>;

    /// Update an existing course
    async fn update(&self, course: &Course) -> Result<Course>;

    /// Update a course's display order
    async fn update_order(&self, id: i64, display_order: i32) -> Result<()>;

    /// Delete a course (features cascade)
    async fn delete(&self, id: i64) -> Result<()>;

    /// Add a feature to a course
    async fn add_feature(&self, feature: &CourseFeature) -> Result<CourseFeature>;

    /// Get a feature by ID
    async fn get_feature(&self, id: i64) -> Result<Option<CourseFeature>>;

    /// List a course's features ordered by display_order
    async fn list_features(&self, course_id: i64) -> Result<Vec<CourseFeature>>;

    /// Update a feature
    async fn update_feature(&self, feature: &CourseFeature) -> Result<CourseFeature>;

    /// Delete a feature
    async fn delete_feature(&self, id: i64) -> Result<()>;
}

/// SQLx-based course repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCourseRepository {
    pool: DynDatabasePool,
}

impl SqlxCourseRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CourseRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CourseRepository for SqlxCourseRepository {
    async fn create(&self, course: &Course) -> Result<Course> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), course).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), course).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Course>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await,
            DatabaseDriver::Mysql => get_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Course>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), published_only).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), published_only).await
            }
        }
    }

    async fn update(&self, course: &Course) -> Result<Course> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), course).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), course).await,
        }
    }

    async fn update_order(&self, id: i64, display_order: i32) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("UPDATE courses SET display_order = ? WHERE id = ?")
                    .bind(display_order)
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to update course order")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("UPDATE courses SET display_order = ? WHERE id = ?")
                    .bind(display_order)
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to update course order")?;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM courses WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete course")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM courses WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete course")?;
            }
        }
        Ok(())
    }

    async fn add_feature(&self, feature: &CourseFeature) -> Result<CourseFeature> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_feature_sqlite(self.pool.as_sqlite().unwrap(), feature).await
            }
            DatabaseDriver::Mysql => {
                add_feature_mysql(self.pool.as_mysql().unwrap(), feature).await
            }
        }
    }

    async fn get_feature(&self, id: i64) -> Result<Option<CourseFeature>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_feature_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_feature_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_features(&self, course_id: i64) -> Result<Vec<CourseFeature>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_features_sqlite(self.pool.as_sqlite().unwrap(), course_id).await
            }
            DatabaseDriver::Mysql => {
                list_features_mysql(self.pool.as_mysql().unwrap(), course_id).await
            }
        }
    }

    async fn update_feature(&self, feature: &CourseFeature) -> Result<CourseFeature> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("UPDATE course_features SET label = ?, display_order = ? WHERE id = ?")
                    .bind(&feature.label)
                    .bind(feature.display_order)
                    .bind(feature.id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to update course feature")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("UPDATE course_features SET label = ?, display_order = ? WHERE id = ?")
                    .bind(&feature.label)
                    .bind(feature.display_order)
                    .bind(feature.id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to update course feature")?;
            }
        }
        Ok(feature.clone())
    }

    async fn delete_feature(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM course_features WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete course feature")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM course_features WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete course feature")?;
            }
        }
        Ok(())
    }
}

const COLUMNS: &str = "id, slug, title, summary, description, duration, price_label, image_url, published, display_order, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, course: &Course) -> Result<Course> {
    let result = sqlx::query(
        r#"
        INSERT INTO courses (slug, title, summary, description, duration, price_label,
                             image_url, published, display_order, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&course.slug)
    .bind(&course.title)
    .bind(&course.summary)
    .bind(&course.description)
    .bind(&course.duration)
    .bind(&course.price_label)
    .bind(&course.image_url)
    .bind(course.published)
    .bind(course.display_order)
    .bind(course.created_at)
    .bind(course.updated_at)
    .execute(pool)
    .await
    .context("Failed to create course")?;

    let mut created = course.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Course>> {
    let query = format!("SELECT {} FROM courses WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get course")?;

    row.map(|r| row_to_course_sqlite(&r)).transpose()
}

async fn get_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Course>> {
    let query = format!("SELECT {} FROM courses WHERE slug = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get course by slug")?;

    row.map(|r| row_to_course_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Course>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM courses WHERE published = 1 ORDER BY display_order, id",
            COLUMNS
        )
    } else {
        format!("SELECT {} FROM courses ORDER BY display_order, id", COLUMNS)
    };
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list courses")?;

    rows.iter().map(row_to_course_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, course: &Course) -> Result<Course> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE courses
        SET slug = ?, title = ?, summary = ?, description = ?, duration = ?,
            price_label = ?, image_url = ?, published = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&course.slug)
    .bind(&course.title)
    .bind(&course.summary)
    .bind(&course.description)
    .bind(&course.duration)
    .bind(&course.price_label)
    .bind(&course.image_url)
    .bind(course.published)
    .bind(course.display_order)
    .bind(now)
    .bind(course.id)
    .execute(pool)
    .await
    .context("Failed to update course")?;

    let mut updated = course.clone();
    updated.updated_at = now;
    Ok(updated)
}

async fn add_feature_sqlite(pool: &SqlitePool, feature: &CourseFeature) -> Result<CourseFeature> {
    let result = sqlx::query(
        "INSERT INTO course_features (course_id, label, display_order) VALUES (?, ?, ?)",
    )
    .bind(feature.course_id)
    .bind(&feature.label)
    .bind(feature.display_order)
    .execute(pool)
    .await
    .context("Failed to add course feature")?;

    let mut created = feature.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_feature_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<CourseFeature>> {
    let row = sqlx::query(
        "SELECT id, course_id, label, display_order FROM course_features WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get course feature")?;

    Ok(row.map(|r| CourseFeature {
        id: r.get("id"),
        course_id: r.get("course_id"),
        label: r.get("label"),
        display_order: r.get("display_order"),
    }))
}

async fn list_features_sqlite(pool: &SqlitePool, course_id: i64) -> Result<Vec<CourseFeature>> {
    let rows = sqlx::query(
        "SELECT id, course_id, label, display_order FROM course_features WHERE course_id = ? ORDER BY display_order, id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
    .context("Failed to list course features")?;

    Ok(rows
        .iter()
        .map(|r| CourseFeature {
            id: r.get("id"),
            course_id: r.get("course_id"),
            label: r.get("label"),
            display_order: r.get("display_order"),
        })
        .collect())
}

fn row_to_course_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Course> {
    Ok(Course {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        summary: row.get("summary"),
        description: row.get("description"),
        duration: row.get("duration"),
        price_label: row.get("price_label"),
        image_url: row.get("image_url"),
        published: row.get::<i64, _>("published") != 0,
        display_order: row.get("display_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, course: &Course) -> Result<Course> {
    let result = sqlx::query(
        r#"
        INSERT INTO courses (slug, title, summary, description, duration, price_label,
                             image_url, published, display_order, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&course.slug)
    .bind(&course.title)
    .bind(&course.summary)
    .bind(&course.description)
    .bind(&course.duration)
    .bind(&course.price_label)
    .bind(&course.image_url)
    .bind(course.published)
    .bind(course.display_order)
    .bind(course.created_at)
    .bind(course.updated_at)
    .execute(pool)
    .await
    .context("Failed to create course")?;

    let mut created = course.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Course>> {
    let query = format!("SELECT {} FROM courses WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get course")?;

    row.map(|r| row_to_course_mysql(&r)).transpose()
}

async fn get_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Course>> {
    let query = format!("SELECT {} FROM courses WHERE slug = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get course by slug")?;

    row.map(|r| row_to_course_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Course>> {
    let query = if published_only {
        format!(
            "SELECT {} FROM courses WHERE published = 1 ORDER BY display_order, id",
            COLUMNS
        )
    } else {
        format!("SELECT {} FROM courses ORDER BY display_order, id", COLUMNS)
    };
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list courses")?;

    rows.iter().map(row_to_course_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, course: &Course) -> Result<Course> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE courses
        SET slug = ?, title = ?, summary = ?, description = ?, duration = ?,
            price_label = ?, image_url = ?, published = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&course.slug)
    .bind(&course.title)
    .bind(&course.summary)
    .bind(&course.description)
    .bind(&course.duration)
    .bind(&course.price_label)
    .bind(&course.image_url)
    .bind(course.published)
    .bind(course.display_order)
    .bind(now)
    .bind(course.id)
    .execute(pool)
    .await
    .context("Failed to update course")?;

    let mut updated = course.clone();
    updated.updated_at = now;
    Ok(updated)
}

async fn add_feature_mysql(pool: &MySqlPool, feature: &CourseFeature) -> Result<CourseFeature> {
    let result = sqlx::query(
        "INSERT INTO course_features (course_id, label, display_order) VALUES (?, ?, ?)",
    )
    .bind(feature.course_id)
    .bind(&feature.label)
    .bind(feature.display_order)
    .execute(pool)
    .await
    .context("Failed to add course feature")?;

    let mut created = feature.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_feature_mysql(pool: &MySqlPool, id: i64) -> Result<Option<CourseFeature>> {
    let row = sqlx::query(
        "SELECT id, course_id, label, display_order FROM course_features WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get course feature")?;

    Ok(row.map(|r| CourseFeature {
        id: r.get("id"),
        course_id: r.get("course_id"),
        label: r.get("label"),
        display_order: r.get("display_order"),
    }))
}

async fn list_features_mysql(pool: &MySqlPool, course_id: i64) -> Result<Vec<CourseFeature>> {
    let rows = sqlx::query(
        "SELECT id, course_id, label, display_order FROM course_features WHERE course_id = ? ORDER BY display_order, id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
    .context("Failed to list course features")?;

    Ok(rows
        .iter()
        .map(|r| CourseFeature {
            id: r.get("id"),
            course_id: r.get("course_id"),
            label: r.get("label"),
            display_order: r.get("display_order"),
        })
        .collect())
}

fn row_to_course_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Course> {
    Ok(Course {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        summary: row.get("summary"),
        description: row.get("description"),
        duration: row.get("duration"),
        price_label: row.get("price_label"),
        image_url: row.get("image_url"),
        published: row.get::<i8, _>("published") != 0,
        display_order: row.get("display_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxCourseRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxCourseRepository::new(pool)
    }

    fn test_course(slug: &str, published: bool, order: i32) -> Course {
        let now = Utc::now();
        Course {
            id: 0,
            slug: slug.to_string(),
            title: format!("Course {}", slug),
            summary: String::new(),
            description: String::new(),
            duration: "2 days".to_string(),
            price_label: String::new(),
            image_url: String::new(),
            published,
            display_order: order,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&test_course("rust-101", true, 0))
            .await
            .expect("create failed");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("get failed")
            .expect("course not found");
        assert_eq!(found.slug, "rust-101");
        assert!(found.published);

        let by_slug = repo
            .get_by_slug("rust-101")
            .await
            .expect("get failed")
            .expect("course not found");
        assert_eq!(by_slug.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let repo = setup_test_repo().await;
        repo.create(&test_course("rust-101", true, 0))
            .await
            .expect("create failed");

        assert!(repo.create(&test_course("rust-101", true, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_respects_published_and_order() {
        let repo = setup_test_repo().await;
        repo.create(&test_course("b-course", true, 2)).await.unwrap();
        repo.create(&test_course("a-course", true, 1)).await.unwrap();
        repo.create(&test_course("draft", false, 0)).await.unwrap();

        let public = repo.list(true).await.expect("list failed");
        assert_eq!(public.len(), 2);
        assert_eq!(public[0].slug, "a-course");
        assert_eq!(public[1].slug, "b-course");

        let all = repo.list(false).await.expect("list failed");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].slug, "draft");
    }

    #[tokio::test]
    async fn test_update_and_reorder() {
        let repo = setup_test_repo().await;
        let mut course = repo
            .create(&test_course("rust-101", false, 0))
            .await
            .expect("create failed");

        course.title = "Rust, properly".to_string();
        course.published = true;
        repo.update(&course).await.expect("update failed");

        repo.update_order(course.id, 9).await.expect("reorder failed");

        let found = repo
            .get_by_id(course.id)
            .await
            .expect("get failed")
            .expect("course not found");
        assert_eq!(found.title, "Rust, properly");
        assert!(found.published);
        assert_eq!(found.display_order, 9);
    }

    #[tokio::test]
    async fn test_features_crud() {
        let repo = setup_test_repo().await;
        let course = repo
            .create(&test_course("rust-101", true, 0))
            .await
            .expect("create failed");

        let f1 = repo
            .add_feature(&CourseFeature {
                id: 0,
                course_id: course.id,
                label: "Hands-on labs".to_string(),
                display_order: 1,
            })
            .await
            .expect("add failed");
        let f2 = repo
            .add_feature(&CourseFeature {
                id: 0,
                course_id: course.id,
                label: "Certificate".to_string(),
                display_order: 0,
            })
            .await
            .expect("add failed");

        let features = repo.list_features(course.id).await.expect("list failed");
        assert_eq!(features.len(), 2);
        // Ordered by display_order
        assert_eq!(features[0].id, f2.id);
        assert_eq!(features[1].id, f1.id);

        let mut updated = f1.clone();
        updated.label = "Guided labs".to_string();
        repo.update_feature(&updated).await.expect("update failed");

        let reloaded = repo
            .get_feature(f1.id)
            .await
            .expect("get failed")
            .expect("feature not found");
        assert_eq!(reloaded.label, "Guided labs");

        repo.delete_feature(f2.id).await.expect("delete failed");
        assert!(repo.get_feature(f2.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_features() {
        let repo = setup_test_repo().await;
        let course = repo
            .create(&test_course("rust-101", true, 0))
            .await
            .expect("create failed");
        repo.add_feature(&CourseFeature {
            id: 0,
            course_id: course.id,
            label: "Labs".to_string(),
            display_order: 0,
        })
        .await
        .expect("add failed");

        repo.delete(course.id).await.expect("delete failed");

        assert!(repo.get_by_id(course.id).await.unwrap().is_none());
        assert!(repo
            .list_features(course.id)
            .await
            .expect("list failed")
            .is_empty());
    }
}
