//! Stored file model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file managed through the admin media library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: i64,
    /// Name on disk (uuid-based, unique)
    pub filename: String,
    /// Name the file was uploaded with
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// SHA-256 of the file contents, hex encoded
    pub checksum: String,
    /// Public URL the file is served from
    pub url: String,
    pub created_at: DateTime<Utc>,
}
