//! File management API endpoints
//!
//! - POST /api/v1/admin/files - Upload a file (multipart)
//! - GET /api/v1/admin/files - List stored files
//! - DELETE /api/v1/admin/files/{id} - Delete a file (record and disk)
//!
//! Uploaded files are served publicly from /uploads/.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::StoredFile;
use crate::services::{FileServiceError, UploadedData};

/// Build the admin file router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_file))
        .route("/", get(list_files))
        .route("/{id}", delete(delete_file))
}

/// POST /api/v1/admin/files - Upload a file
///
/// Accepts multipart/form-data with a single field named "file".
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name().unwrap_or("") != "file" {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to read file: {}", e)))?;

        let stored = state
            .file_service
            .store(UploadedData {
                original_name,
                content_type,
                data: data.to_vec(),
            })
            .await
            .map_err(map_file_error)?;

        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(ApiError::validation_error("No file provided"))
}

/// GET /api/v1/admin/files - List stored files
async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<StoredFile>>, ApiError> {
    let files = state.file_service.list().await.map_err(map_file_error)?;
    Ok(Json(files))
}

/// DELETE /api/v1/admin/files/{id} - Delete a stored file
async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.file_service.delete(id).await.map_err(map_file_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_file_error(e: FileServiceError) -> ApiError {
    match e {
        FileServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        FileServiceError::NotFound => ApiError::not_found("File not found"),
        FileServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}
