//! Admin user model
//!
//! Kursa has a flat admin model: every row in `admin_users` is an
//! administrator of the site content. There is no role hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Administrator account for the content backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2id, PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// Create a new AdminUser.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
