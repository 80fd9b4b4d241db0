//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session entity for admin authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token)
    pub id: String,
    /// Associated admin user ID
    pub user_id: i64,
    /// Per-session CSRF nonce
    pub csrf_token: String,
    /// Client IP at login, if known
    pub ip_address: Option<String>,
    /// Client user agent at login, if known
    pub user_agent: Option<String>,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Remaining lifetime; zero when already expired
    pub fn remaining(&self) -> chrono::Duration {
        (self.expires_at - Utc::now()).max(chrono::Duration::zero())
    }
}
