//! Team member service

use crate::cache::MemoryCache;
use crate::db::repositories::TeamMemberRepository;
use crate::models::{CreateTeamMemberInput, OrderItem, TeamMember, UpdateTeamMemberInput};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::sync::Arc;

const LIST_CACHE_KEY: &str = "team:list";

pub struct TeamMemberService {
    repo: Arc<dyn TeamMemberRepository>,
    cache: Arc<MemoryCache>,
}

impl TeamMemberService {
    pub fn new(repo: Arc<dyn TeamMemberRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// List team members ordered by display_order, cached
    pub async fn list(&self) -> Result<Vec<TeamMember>> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<TeamMember>>(LIST_CACHE_KEY).await {
            return Ok(cached);
        }

        let members = self.repo.list().await?;
        let _ = self.cache.set(LIST_CACHE_KEY, &members).await;
        Ok(members)
    }

    pub async fn get(&self, id: i64) -> Result<Option<TeamMember>> {
        self.repo.get_by_id(id).await
    }

    pub async fn create(&self, input: CreateTeamMemberInput) -> Result<TeamMember> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(anyhow!("Name cannot be empty"));
        }

        let now = Utc::now();
        let member = TeamMember {
            id: 0,
            name,
            title: input.title,
            bio: input.bio,
            photo_url: input.photo_url,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&member).await?;
        self.invalidate().await?;
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: UpdateTeamMemberInput) -> Result<TeamMember> {
        let mut member = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("Team member not found"))?;

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(anyhow!("Name cannot be empty"));
            }
            member.name = name;
        }
        if let Some(title) = input.title {
            member.title = title;
        }
        if let Some(bio) = input.bio {
            member.bio = bio;
        }
        if let Some(photo_url) = input.photo_url {
            member.photo_url = photo_url;
        }
        if let Some(display_order) = input.display_order {
            member.display_order = display_order;
        }

        let updated = self.repo.update(&member).await?;
        self.invalidate().await?;
        Ok(updated)
    }

    /// Bulk update display orders
    pub async fn update_order(&self, items: Vec<OrderItem>) -> Result<()> {
        for item in items {
            self.repo.update_order(item.id, item.display_order).await?;
        }
        self.invalidate().await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        self.invalidate().await
    }

    async fn invalidate(&self) -> Result<()> {
        self.cache
            .delete(LIST_CACHE_KEY)
            .await
            .context("Failed to invalidate team cache")
    }
}
