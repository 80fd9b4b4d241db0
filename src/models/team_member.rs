//! Team member model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trainer or staff member shown on the team page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    /// Job title, e.g. "Lead Trainer"
    pub title: String,
    pub bio: String,
    pub photo_url: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a team member
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamMemberInput {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub display_order: i32,
}

/// Input for updating a team member; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamMemberInput {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub display_order: Option<i32>,
}
