//! File service
//!
//! Manages the admin media library: writes uploads to the upload
//! directory under a uuid-based name, records metadata (including a
//! SHA-256 checksum) in the database, and removes the disk file when the
//! record is deleted.

use crate::config::UploadConfig;
use crate::db::repositories::FileRepository;
use crate::models::StoredFile;
use anyhow::Context;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

/// Error types for file operations
#[derive(Debug, thiserror::Error)]
pub enum FileServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("File not found")]
    NotFound,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// An upload read from the request body
#[derive(Debug)]
pub struct UploadedData {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct FileService {
    repo: Arc<dyn FileRepository>,
    config: Arc<UploadConfig>,
}

impl FileService {
    pub fn new(repo: Arc<dyn FileRepository>, config: Arc<UploadConfig>) -> Self {
        Self { repo, config }
    }

    /// List all stored files, newest first
    pub async fn list(&self) -> Result<Vec<StoredFile>, FileServiceError> {
        Ok(self.repo.list().await?)
    }

    /// Store an upload on disk and record it in the database
    pub async fn store(&self, upload: UploadedData) -> Result<StoredFile, FileServiceError> {
        if upload.data.is_empty() {
            return Err(FileServiceError::ValidationError(
                "File is empty".to_string(),
            ));
        }

        if !self.config.is_type_allowed(&upload.content_type) {
            return Err(FileServiceError::ValidationError(format!(
                "Invalid file type: {}. Allowed types: {:?}",
                upload.content_type, self.config.allowed_types
            )));
        }

        if upload.data.len() as u64 > self.config.max_file_size {
            return Err(FileServiceError::ValidationError(format!(
                "File too large. Maximum size: {} bytes ({} MB)",
                self.config.max_file_size,
                self.config.max_file_size / 1024 / 1024
            )));
        }

        fs::create_dir_all(&self.config.path)
            .await
            .context("Failed to create upload directory")?;

        let ext = self.config.get_extension(&upload.content_type);
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.config.path.join(&filename);

        fs::write(&path, &upload.data)
            .await
            .context("Failed to write uploaded file")?;

        let checksum = hex::encode(Sha256::digest(&upload.data));

        let record = StoredFile {
            id: 0,
            filename: filename.clone(),
            original_name: upload.original_name,
            content_type: upload.content_type,
            size_bytes: upload.data.len() as i64,
            checksum,
            url: format!("/uploads/{}", filename),
            created_at: Utc::now(),
        };

        match self.repo.create(&record).await {
            Ok(created) => Ok(created),
            Err(e) => {
                // Don't leave an orphan on disk if the insert failed
                let _ = fs::remove_file(&path).await;
                Err(e.into())
            }
        }
    }

    /// Delete a stored file: removes the database record and the disk file
    pub async fn delete(&self, id: i64) -> Result<(), FileServiceError> {
        let file = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(FileServiceError::NotFound)?;

        self.repo.delete(id).await?;

        let path = self.config.path.join(&file.filename);
        if let Err(e) = fs::remove_file(&path).await {
            // The record is gone either way; a missing disk file is not fatal
            tracing::warn!("Failed to remove file {:?}: {}", path, e);
        }

        Ok(())
    }
}
