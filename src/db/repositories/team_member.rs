//! Team member repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::TeamMember;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait TeamMemberRepository: Send + Sync {
    async fn create(&self, member: &TeamMember) -> Result<TeamMember>;
    async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>>;
    async fn list(&self) -> Result<Vec<TeamMember>>;
    async fn update(&self, member: &TeamMember) -> Result<TeamMember>;
    async fn update_order(&self, id: i64, display_order: i32) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct SqlxTeamMemberRepository {
    pool: DynDatabasePool,
}

impl SqlxTeamMemberRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TeamMemberRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TeamMemberRepository for SqlxTeamMemberRepository {
    async fn create(&self, member: &TeamMember) -> Result<TeamMember> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), member).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), member).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<TeamMember>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, member: &TeamMember) -> Result<TeamMember> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), member).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), member).await,
        }
    }

    async fn update_order(&self, id: i64, display_order: i32) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("UPDATE team_members SET display_order = ? WHERE id = ?")
                    .bind(display_order)
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to update team member order")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("UPDATE team_members SET display_order = ? WHERE id = ?")
                    .bind(display_order)
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to update team member order")?;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM team_members WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to delete team member")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM team_members WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to delete team member")?;
            }
        }
        Ok(())
    }
}

const COLUMNS: &str = "id, name, title, bio, photo_url, display_order, created_at, updated_at";

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, member: &TeamMember) -> Result<TeamMember> {
    let result = sqlx::query(
        r#"
        INSERT INTO team_members (name, title, bio, photo_url, display_order, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&member.name)
    .bind(&member.title)
    .bind(&member.bio)
    .bind(&member.photo_url)
    .bind(member.display_order)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(pool)
    .await
    .context("Failed to create team member")?;

    let mut created = member.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<TeamMember>> {
    let query = format!("SELECT {} FROM team_members WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get team member")?;

    row.map(|r| row_to_member_sqlite(&r)).transpose()
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<TeamMember>> {
    let query = format!(
        "SELECT {} FROM team_members ORDER BY display_order, id",
        COLUMNS
    );
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list team members")?;

    rows.iter().map(row_to_member_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, member: &TeamMember) -> Result<TeamMember> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE team_members
        SET name = ?, title = ?, bio = ?, photo_url = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&member.name)
    .bind(&member.title)
    .bind(&member.bio)
    .bind(&member.photo_url)
    .bind(member.display_order)
    .bind(now)
    .bind(member.id)
    .execute(pool)
    .await
    .context("Failed to update team member")?;

    let mut updated = member.clone();
    updated.updated_at = now;
    Ok(updated)
}

fn row_to_member_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<TeamMember> {
    Ok(TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        title: row.get("title"),
        bio: row.get("bio"),
        photo_url: row.get("photo_url"),
        display_order: row.get("display_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, member: &TeamMember) -> Result<TeamMember> {
    let result = sqlx::query(
        r#"
        INSERT INTO team_members (name, title, bio, photo_url, display_order, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&member.name)
    .bind(&member.title)
    .bind(&member.bio)
    .bind(&member.photo_url)
    .bind(member.display_order)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(pool)
    .await
    .context("Failed to create team member")?;

    let mut created = member.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<TeamMember>> {
    let query = format!("SELECT {} FROM team_members WHERE id = ?", COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get team member")?;

    row.map(|r| row_to_member_mysql(&r)).transpose()
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<TeamMember>> {
    let query = format!(
        "SELECT {} FROM team_members ORDER BY display_order, id",
        COLUMNS
    );
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .context("Failed to list team members")?;

    rows.iter().map(row_to_member_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, member: &TeamMember) -> Result<TeamMember> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE team_members
        SET name = ?, title = ?, bio = ?, photo_url = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&member.name)
    .bind(&member.title)
    .bind(&member.bio)
    .bind(&member.photo_url)
    .bind(member.display_order)
    .bind(now)
    .bind(member.id)
    .execute(pool)
    .await
    .context("Failed to update team member")?;

    let mut updated = member.clone();
    updated.updated_at = now;
    Ok(updated)
}

fn row_to_member_mysql(row: &sqlx::mysql::MySqlRow) -> Result<TeamMember> {
    Ok(TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        title: row.get("title"),
        bio: row.get("bio"),
        photo_url: row.get("photo_url"),
        display_order: row.get("display_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
