//! Testimonial service

use crate::cache::MemoryCache;
use crate::db::repositories::TestimonialRepository;
use crate::models::{CreateTestimonialInput, Testimonial, UpdateTestimonialInput};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

const LIST_PUBLIC_CACHE_KEY: &str = "testimonials:list:public";

/// Error types for testimonial operations
#[derive(Debug, thiserror::Error)]
pub enum TestimonialServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Testimonial not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct TestimonialService {
    repo: Arc<dyn TestimonialRepository>,
    cache: Arc<MemoryCache>,
}

impl TestimonialService {
    pub fn new(repo: Arc<dyn TestimonialRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// List published testimonials, cached for the public site
    pub async fn list_public(&self) -> Result<Vec<Testimonial>, TestimonialServiceError> {
        if let Ok(Some(cached)) = self
            .cache
            .get::<Vec<Testimonial>>(LIST_PUBLIC_CACHE_KEY)
            .await
        {
            return Ok(cached);
        }

        let testimonials = self.repo.list(true).await?;
        let _ = self.cache.set(LIST_PUBLIC_CACHE_KEY, &testimonials).await;
        Ok(testimonials)
    }

    /// List all testimonials including unpublished (admin view)
    pub async fn list_all(&self) -> Result<Vec<Testimonial>, TestimonialServiceError> {
        Ok(self.repo.list(false).await?)
    }

    pub async fn create(
        &self,
        input: CreateTestimonialInput,
    ) -> Result<Testimonial, TestimonialServiceError> {
        let author = input.author.trim().to_string();
        if author.is_empty() {
            return Err(TestimonialServiceError::ValidationError(
                "Author cannot be empty".to_string(),
            ));
        }
        if input.quote.trim().is_empty() {
            return Err(TestimonialServiceError::ValidationError(
                "Quote cannot be empty".to_string(),
            ));
        }
        validate_rating(input.rating)?;

        let testimonial = Testimonial {
            id: 0,
            author,
            company: input.company,
            quote: input.quote,
            rating: input.rating,
            published: input.published,
            display_order: input.display_order,
            created_at: Utc::now(),
        };

        let created = self.repo.create(&testimonial).await?;
        self.invalidate().await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateTestimonialInput,
    ) -> Result<Testimonial, TestimonialServiceError> {
        let mut testimonial = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(TestimonialServiceError::NotFound)?;

        if let Some(author) = input.author {
            let author = author.trim().to_string();
            if author.is_empty() {
                return Err(TestimonialServiceError::ValidationError(
                    "Author cannot be empty".to_string(),
                ));
            }
            testimonial.author = author;
        }
        if let Some(company) = input.company {
            testimonial.company = company;
        }
        if let Some(quote) = input.quote {
            if quote.trim().is_empty() {
                return Err(TestimonialServiceError::ValidationError(
                    "Quote cannot be empty".to_string(),
                ));
            }
            testimonial.quote = quote;
        }
        if let Some(rating) = input.rating {
            validate_rating(rating)?;
            testimonial.rating = rating;
        }
        if let Some(published) = input.published {
            testimonial.published = published;
        }
        if let Some(display_order) = input.display_order {
            testimonial.display_order = display_order;
        }

        let updated = self.repo.update(&testimonial).await?;
        self.invalidate().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), TestimonialServiceError> {
        if self.repo.get_by_id(id).await?.is_none() {
            return Err(TestimonialServiceError::NotFound);
        }
        self.repo.delete(id).await?;
        self.invalidate().await?;
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), TestimonialServiceError> {
        self.cache
            .delete(LIST_PUBLIC_CACHE_KEY)
            .await
            .context("Failed to invalidate testimonial cache")?;
        Ok(())
    }
}

fn validate_rating(rating: Option<i32>) -> Result<(), TestimonialServiceError> {
    if let Some(r) = rating {
        if !(1..=5).contains(&r) {
            return Err(TestimonialServiceError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
    }
    Ok(())
}
