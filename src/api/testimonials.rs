//! Testimonial API endpoints
//!
//! - GET /api/v1/testimonials - Public published testimonials
//! - GET /api/v1/admin/testimonials - All testimonials
//! - POST /api/v1/admin/testimonials - Create testimonial
//! - PUT /api/v1/admin/testimonials/{id} - Update testimonial
//! - DELETE /api/v1/admin/testimonials/{id} - Delete testimonial

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateTestimonialInput, Testimonial, UpdateTestimonialInput};
use crate::services::TestimonialServiceError;

/// Build the public testimonial router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_public_testimonials))
}

/// Build the admin testimonial router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_testimonials))
        .route("/", post(create_testimonial))
        .route("/{id}", put(update_testimonial))
        .route("/{id}", delete(delete_testimonial))
}

/// GET /api/v1/testimonials - List published testimonials
async fn list_public_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let testimonials = state
        .testimonial_service
        .list_public()
        .await
        .map_err(map_testimonial_error)?;
    Ok(Json(testimonials))
}

/// GET /api/v1/admin/testimonials - List all testimonials
async fn list_all_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let testimonials = state
        .testimonial_service
        .list_all()
        .await
        .map_err(map_testimonial_error)?;
    Ok(Json(testimonials))
}

/// POST /api/v1/admin/testimonials - Create a testimonial
async fn create_testimonial(
    State(state): State<AppState>,
    Json(body): Json<CreateTestimonialInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .testimonial_service
        .create(body)
        .await
        .map_err(map_testimonial_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/testimonials/{id} - Update a testimonial
async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTestimonialInput>,
) -> Result<Json<Testimonial>, ApiError> {
    let updated = state
        .testimonial_service
        .update(id, body)
        .await
        .map_err(map_testimonial_error)?;
    Ok(Json(updated))
}

/// DELETE /api/v1/admin/testimonials/{id} - Delete a testimonial
async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .testimonial_service
        .delete(id)
        .await
        .map_err(map_testimonial_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_testimonial_error(e: TestimonialServiceError) -> ApiError {
    match e {
        TestimonialServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        TestimonialServiceError::NotFound => ApiError::not_found("Testimonial not found"),
        TestimonialServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}
