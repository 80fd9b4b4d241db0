//! Company info service

use crate::cache::MemoryCache;
use crate::db::repositories::CompanyRepository;
use crate::models::{CompanyInfo, UpdateCompanyInput};
use anyhow::{Context, Result};
use std::sync::Arc;

const CACHE_KEY: &str = "company:info";

pub struct CompanyService {
    repo: Arc<dyn CompanyRepository>,
    cache: Arc<MemoryCache>,
}

impl CompanyService {
    pub fn new(repo: Arc<dyn CompanyRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// Get the company info, served from cache when warm
    pub async fn get(&self) -> Result<CompanyInfo> {
        if let Ok(Some(cached)) = self.cache.get::<CompanyInfo>(CACHE_KEY).await {
            return Ok(cached);
        }

        let info = self.repo.get().await.context("Failed to load company info")?;
        let _ = self.cache.set(CACHE_KEY, &info).await;
        Ok(info)
    }

    /// Apply a partial update to the company info
    pub async fn update(&self, input: UpdateCompanyInput) -> Result<CompanyInfo> {
        let current = self.repo.get().await.context("Failed to load company info")?;
        let updated = self.repo.update(&input.apply(current)).await?;

        self.cache.delete(CACHE_KEY).await?;
        Ok(updated)
    }
}
