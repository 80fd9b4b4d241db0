//! Page section service
//!
//! Typed access to the hero and footer documents stored in the
//! `sections` table.

use crate::cache::MemoryCache;
use crate::db::repositories::SectionRepository;
use crate::models::{FooterContent, HeroContent};
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

const HERO_KEY: &str = "hero";
const FOOTER_KEY: &str = "footer";

pub struct SectionService {
    repo: Arc<dyn SectionRepository>,
    cache: Arc<MemoryCache>,
}

impl SectionService {
    pub fn new(repo: Arc<dyn SectionRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// Get the hero section
    pub async fn get_hero(&self) -> Result<HeroContent> {
        self.get_section(HERO_KEY).await
    }

    /// Replace the hero section
    pub async fn update_hero(&self, hero: &HeroContent) -> Result<()> {
        self.set_section(HERO_KEY, hero).await
    }

    /// Get the footer section
    pub async fn get_footer(&self) -> Result<FooterContent> {
        self.get_section(FOOTER_KEY).await
    }

    /// Replace the footer section
    pub async fn update_footer(&self, footer: &FooterContent) -> Result<()> {
        self.set_section(FOOTER_KEY, footer).await
    }

    async fn get_section<T: Serialize + DeserializeOwned + Default + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<T> {
        let cache_key = format!("sections:{}", key);
        if let Ok(Some(cached)) = self.cache.get::<T>(&cache_key).await {
            return Ok(cached);
        }

        let value = match self.repo.get(key).await? {
            Some(section) => serde_json::from_str(&section.value)
                .with_context(|| format!("Failed to parse section '{}'", key))?,
            // Missing row behaves like the seeded empty document
            None => T::default(),
        };

        let _ = self.cache.set(&cache_key, &value).await;
        Ok(value)
    }

    async fn set_section<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize section '{}'", key))?;
        self.repo.set(key, &json).await?;
        self.cache.delete(&format!("sections:{}", key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSectionRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::FooterLink;

    async fn setup_test_service() -> SectionService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        SectionService::new(
            SqlxSectionRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
        )
    }

    #[tokio::test]
    async fn test_fresh_sections_are_empty() {
        let service = setup_test_service().await;

        let hero = service.get_hero().await.expect("get failed");
        assert_eq!(hero, HeroContent::default());

        let footer = service.get_footer().await.expect("get failed");
        assert_eq!(footer, FooterContent::default());
    }

    #[tokio::test]
    async fn test_hero_roundtrip() {
        let service = setup_test_service().await;

        let hero = HeroContent {
            title: "Learn Rust in 3 days".to_string(),
            subtitle: "Hands-on training".to_string(),
            cta_label: "Book now".to_string(),
            cta_url: "/courses".to_string(),
            background_image_url: "/uploads/hero.jpg".to_string(),
        };
        service.update_hero(&hero).await.expect("update failed");

        let loaded = service.get_hero().await.expect("get failed");
        assert_eq!(loaded, hero);
    }

    #[tokio::test]
    async fn test_footer_update_invalidates_cache() {
        let service = setup_test_service().await;

        // Warm cache with the empty footer
        service.get_footer().await.expect("get failed");

        let footer = FooterContent {
            text: "© Kursa Training".to_string(),
            links: vec![FooterLink {
                label: "Privacy".to_string(),
                url: "/privacy".to_string(),
            }],
        };
        service.update_footer(&footer).await.expect("update failed");

        let loaded = service.get_footer().await.expect("get failed");
        assert_eq!(loaded.links.len(), 1);
        assert_eq!(loaded.text, "© Kursa Training");
    }
}
