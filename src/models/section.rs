//! Page section documents (hero, footer)
//!
//! Sections are keyed JSON documents in the `sections` table. Each has a
//! typed shape used by the API; unknown fields in stored documents are
//! ignored so old rows keep deserializing after shape changes.

use serde::{Deserialize, Serialize};

/// Hero banner content for the landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_url: String,
    #[serde(default)]
    pub background_image_url: String,
}

/// Footer content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterContent {
    #[serde(default)]
    pub text: String,
    /// Rendered in list order
    #[serde(default)]
    pub links: Vec<FooterLink>,
}

/// A single footer link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}
