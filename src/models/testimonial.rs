//! Testimonial model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer quote shown on the marketing site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: i64,
    pub author: String,
    pub company: String,
    pub quote: String,
    /// Optional star rating, 1 to 5
    pub rating: Option<i32>,
    /// Only published testimonials appear on the public site
    pub published: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a testimonial
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonialInput {
    pub author: String,
    #[serde(default)]
    pub company: String,
    pub quote: String,
    pub rating: Option<i32>,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub display_order: i32,
}

fn default_published() -> bool {
    true
}

/// Input for updating a testimonial; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTestimonialInput {
    pub author: Option<String>,
    pub company: Option<String>,
    pub quote: Option<String>,
    /// `Some(None)` clears the rating
    #[serde(default, with = "double_option")]
    pub rating: Option<Option<i32>>,
    pub published: Option<bool>,
    pub display_order: Option<i32>,
}

/// Deserialize a field that distinguishes "absent" from "null".
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(de).map(Some)
    }
}
