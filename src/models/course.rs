//! Course and course feature models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    /// URL-friendly identifier (unique)
    pub slug: String,
    pub title: String,
    /// Short blurb shown on listing cards
    pub summary: String,
    pub description: String,
    /// Free-form duration label, e.g. "3 days"
    pub duration: String,
    /// Free-form price label, e.g. "from $1,200"
    pub price_label: String,
    pub image_url: String,
    /// Only published courses appear on the public site
    pub published: bool,
    /// Advisory ordering for UI lists
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bullet-point feature of a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseFeature {
    pub id: i64,
    pub course_id: i64,
    pub label: String,
    pub display_order: i32,
}

/// Course with its features attached, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseWithFeatures {
    #[serde(flatten)]
    pub course: Course,
    pub features: Vec<CourseFeature>,
}

/// Input for creating a course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseInput {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub price_label: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub display_order: i32,
}

/// Input for updating a course; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub price_label: Option<String>,
    pub image_url: Option<String>,
    pub published: Option<bool>,
    pub display_order: Option<i32>,
}

/// Input for adding a feature to a course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeatureInput {
    pub label: String,
    #[serde(default)]
    pub display_order: i32,
}

/// Input for updating a feature
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeatureInput {
    pub label: Option<String>,
    pub display_order: Option<i32>,
}

/// One entry of a bulk display-order update
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub display_order: i32,
}

/// Generate a URL-friendly slug from a title
///
/// Lowercases, maps whitespace runs to single dashes, and drops anything
/// that is not alphanumeric or a dash.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.chars() {
        if c.is_alphanumeric() {
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
            last_dash = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}
