//! Course service
//!
//! Business logic for courses and their features: slug assignment,
//! validation, cache invalidation, bulk reordering.

use crate::cache::MemoryCache;
use crate::db::repositories::CourseRepository;
use crate::models::{
    generate_slug, Course, CourseFeature, CourseWithFeatures, CreateCourseInput,
    CreateFeatureInput, OrderItem, UpdateCourseInput, UpdateFeatureInput,
};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

const LIST_PUBLIC_CACHE_KEY: &str = "courses:list:public";

/// Error types for course operations
#[derive(Debug, thiserror::Error)]
pub enum CourseServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Course not found")]
    NotFound,

    #[error("Course feature not found")]
    FeatureNotFound,

    #[error("A course with slug '{0}' already exists")]
    SlugExists(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
    cache: Arc<MemoryCache>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// List published courses with features, cached for the public site
    pub async fn list_public(&self) -> Result<Vec<CourseWithFeatures>, CourseServiceError> {
        if let Ok(Some(cached)) = self
            .cache
            .get::<Vec<CourseWithFeatures>>(LIST_PUBLIC_CACHE_KEY)
            .await
        {
            return Ok(cached);
        }

        let courses = self.with_features(self.repo.list(true).await?).await?;
        let _ = self.cache.set(LIST_PUBLIC_CACHE_KEY, &courses).await;

        Ok(courses)
    }

    /// List all courses including drafts (admin view, uncached)
    pub async fn list_all(&self) -> Result<Vec<CourseWithFeatures>, CourseServiceError> {
        let courses = self.repo.list(false).await?;
        self.with_features(courses).await
    }

    /// Get a single course by id with its features
    pub async fn get(&self, id: i64) -> Result<CourseWithFeatures, CourseServiceError> {
        let course = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(CourseServiceError::NotFound)?;
        let features = self.repo.list_features(course.id).await?;
        Ok(CourseWithFeatures { course, features })
    }

    /// Get a published course by id (public view; drafts are invisible)
    pub async fn get_public(&self, id: i64) -> Result<CourseWithFeatures, CourseServiceError> {
        let found = self.get(id).await?;
        if !found.course.published {
            return Err(CourseServiceError::NotFound);
        }
        Ok(found)
    }

    /// Create a new course
    pub async fn create(
        &self,
        input: CreateCourseInput,
    ) -> Result<CourseWithFeatures, CourseServiceError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }

        let slug = match input.slug {
            Some(s) if !s.trim().is_empty() => generate_slug(&s),
            _ => generate_slug(&title),
        };
        if slug.is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Could not derive a slug from the title".to_string(),
            ));
        }

        if self.repo.get_by_slug(&slug).await?.is_some() {
            return Err(CourseServiceError::SlugExists(slug));
        }

        let now = Utc::now();
        let course = Course {
            id: 0,
            slug,
            title,
            summary: input.summary,
            description: input.description,
            duration: input.duration,
            price_label: input.price_label,
            image_url: input.image_url,
            published: input.published,
            display_order: input.display_order,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&course).await?;
        self.invalidate().await?;

        Ok(CourseWithFeatures {
            course: created,
            features: Vec::new(),
        })
    }

    /// Apply a partial update to a course
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCourseInput,
    ) -> Result<CourseWithFeatures, CourseServiceError> {
        let mut course = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(CourseServiceError::NotFound)?;

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(CourseServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            course.title = title;
        }
        if let Some(slug) = input.slug {
            let slug = generate_slug(&slug);
            if slug.is_empty() {
                return Err(CourseServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if let Some(existing) = self.repo.get_by_slug(&slug).await? {
                if existing.id != id {
                    return Err(CourseServiceError::SlugExists(slug));
                }
            }
            course.slug = slug;
        }
        if let Some(summary) = input.summary {
            course.summary = summary;
        }
        if let Some(description) = input.description {
            course.description = description;
        }
        if let Some(duration) = input.duration {
            course.duration = duration;
        }
        if let Some(price_label) = input.price_label {
            course.price_label = price_label;
        }
        if let Some(image_url) = input.image_url {
            course.image_url = image_url;
        }
        if let Some(published) = input.published {
            course.published = published;
        }
        if let Some(display_order) = input.display_order {
            course.display_order = display_order;
        }

        let updated = self.repo.update(&course).await?;
        let features = self.repo.list_features(updated.id).await?;
        self.invalidate().await?;

        Ok(CourseWithFeatures {
            course: updated,
            features,
        })
    }

    /// Bulk update course display orders
    pub async fn update_order(&self, items: Vec<OrderItem>) -> Result<(), CourseServiceError> {
        for item in items {
            self.repo.update_order(item.id, item.display_order).await?;
        }
        self.invalidate().await?;
        Ok(())
    }

    /// Delete a course (features cascade)
    pub async fn delete(&self, id: i64) -> Result<(), CourseServiceError> {
        if self.repo.get_by_id(id).await?.is_none() {
            return Err(CourseServiceError::NotFound);
        }
        self.repo.delete(id).await?;
        self.invalidate().await?;
        Ok(())
    }

    /// Add a feature to a course
    pub async fn add_feature(
        &self,
        course_id: i64,
        input: CreateFeatureInput,
    ) -> Result<CourseFeature, CourseServiceError> {
        if self.repo.get_by_id(course_id).await?.is_none() {
            return Err(CourseServiceError::NotFound);
        }

        let label = input.label.trim().to_string();
        if label.is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Feature label cannot be empty".to_string(),
            ));
        }

        let created = self
            .repo
            .add_feature(&CourseFeature {
                id: 0,
                course_id,
                label,
                display_order: input.display_order,
            })
            .await?;
        self.invalidate().await?;
        Ok(created)
    }

    /// Apply a partial update to a feature
    pub async fn update_feature(
        &self,
        id: i64,
        input: UpdateFeatureInput,
    ) -> Result<CourseFeature, CourseServiceError> {
        let mut feature = self
            .repo
            .get_feature(id)
            .await?
            .ok_or(CourseServiceError::FeatureNotFound)?;

        if let Some(label) = input.label {
            let label = label.trim().to_string();
            if label.is_empty() {
                return Err(CourseServiceError::ValidationError(
                    "Feature label cannot be empty".to_string(),
                ));
            }
            feature.label = label;
        }
        if let Some(display_order) = input.display_order {
            feature.display_order = display_order;
        }

        let updated = self.repo.update_feature(&feature).await?;
        self.invalidate().await?;
        Ok(updated)
    }

    /// Delete a feature
    pub async fn delete_feature(&self, id: i64) -> Result<(), CourseServiceError> {
        if self.repo.get_feature(id).await?.is_none() {
            return Err(CourseServiceError::FeatureNotFound);
        }
        self.repo.delete_feature(id).await?;
        self.invalidate().await?;
        Ok(())
    }

    async fn with_features(
        &self,
        courses: Vec<Course>,
    ) -> Result<Vec<CourseWithFeatures>, CourseServiceError> {
        let mut result = Vec::with_capacity(courses.len());
        for course in courses {
            let features = self.repo.list_features(course.id).await?;
            result.push(CourseWithFeatures { course, features });
        }
        Ok(result)
    }

    async fn invalidate(&self) -> Result<(), CourseServiceError> {
        self.cache
            .delete_pattern("courses:*")
            .await
            .context("Failed to invalidate course cache")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCourseRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> CourseService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        CourseService::new(
            SqlxCourseRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
        )
    }

    fn create_input(title: &str, published: bool) -> CreateCourseInput {
        CreateCourseInput {
            title: title.to_string(),
            slug: None,
            summary: String::new(),
            description: String::new(),
            duration: "2 days".to_string(),
            price_label: String::new(),
            image_url: String::new(),
            published,
            display_order: 0,
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_from_title() {
        let service = setup_test_service().await;

        let created = service
            .create(create_input("Rust for Beginners", true))
            .await
            .expect("create failed");

        assert_eq!(created.course.slug, "rust-for-beginners");
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_rejected() {
        let service = setup_test_service().await;
        service
            .create(create_input("Rust for Beginners", true))
            .await
            .expect("create failed");

        let result = service.create(create_input("Rust for Beginners", true)).await;
        assert!(matches!(result, Err(CourseServiceError::SlugExists(_))));
    }

    #[tokio::test]
    async fn test_create_empty_title_rejected() {
        let service = setup_test_service().await;
        let result = service.create(create_input("   ", true)).await;
        assert!(matches!(result, Err(CourseServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_public_list_hides_drafts() {
        let service = setup_test_service().await;
        service.create(create_input("Published", true)).await.unwrap();
        service.create(create_input("Draft", false)).await.unwrap();

        let public = service.list_public().await.expect("list failed");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].course.title, "Published");

        let all = service.list_all().await.expect("list failed");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_get_public_hides_draft() {
        let service = setup_test_service().await;
        let draft = service.create(create_input("Draft", false)).await.unwrap();

        let result = service.get_public(draft.course.id).await;
        assert!(matches!(result, Err(CourseServiceError::NotFound)));

        // Admin get still sees it
        assert!(service.get(draft.course.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_publishing_invalidates_public_list_cache() {
        let service = setup_test_service().await;
        let draft = service.create(create_input("Course", false)).await.unwrap();

        // Warm the public cache with an empty list
        assert!(service.list_public().await.expect("list failed").is_empty());

        service
            .update(
                draft.course.id,
                UpdateCourseInput {
                    published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("update failed");

        let public = service.list_public().await.expect("list failed");
        assert_eq!(public.len(), 1);
    }

    #[tokio::test]
    async fn test_feature_lifecycle() {
        let service = setup_test_service().await;
        let course = service.create(create_input("Course", true)).await.unwrap();

        let feature = service
            .add_feature(
                course.course.id,
                CreateFeatureInput {
                    label: "Hands-on labs".to_string(),
                    display_order: 0,
                },
            )
            .await
            .expect("add failed");

        let updated = service
            .update_feature(
                feature.id,
                UpdateFeatureInput {
                    label: Some("Guided labs".to_string()),
                    display_order: None,
                },
            )
            .await
            .expect("update failed");
        assert_eq!(updated.label, "Guided labs");

        service.delete_feature(feature.id).await.expect("delete failed");

        let result = service
            .update_feature(feature.id, UpdateFeatureInput::default())
            .await;
        assert!(matches!(result, Err(CourseServiceError::FeatureNotFound)));
    }

    #[tokio::test]
    async fn test_add_feature_to_missing_course() {
        let service = setup_test_service().await;
        let result = service
            .add_feature(
                999,
                CreateFeatureInput {
                    label: "Labs".to_string(),
                    display_order: 0,
                },
            )
            .await;
        assert!(matches!(result, Err(CourseServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_bulk_reorder() {
        let service = setup_test_service().await;
        let a = service.create(create_input("A", true)).await.unwrap();
        let b = service.create(create_input("B", true)).await.unwrap();

        service
            .update_order(vec![
                OrderItem {
                    id: a.course.id,
                    display_order: 2,
                },
                OrderItem {
                    id: b.course.id,
                    display_order: 1,
                },
            ])
            .await
            .expect("reorder failed");

        let list = service.list_all().await.expect("list failed");
        assert_eq!(list[0].course.title, "B");
        assert_eq!(list[1].course.title, "A");
    }

    #[tokio::test]
    async fn test_delete_missing_course() {
        let service = setup_test_service().await;
        let result = service.delete(42).await;
        assert!(matches!(result, Err(CourseServiceError::NotFound)));
    }
}
