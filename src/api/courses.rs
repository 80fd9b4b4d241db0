//! Course API endpoints
//!
//! Public:
//! - GET /api/v1/courses - Published courses with features
//! - GET /api/v1/courses/{id} - One published course
//!
//! Admin:
//! - GET /api/v1/admin/courses - All courses including drafts
//! - POST /api/v1/admin/courses - Create course
//! - PUT /api/v1/admin/courses/order - Bulk display-order update
//! - PUT /api/v1/admin/courses/{id} - Update course
//! - DELETE /api/v1/admin/courses/{id} - Delete course
//! - POST /api/v1/admin/courses/{id}/features - Add feature
//! - PUT /api/v1/admin/features/{id} - Update feature
//! - DELETE /api/v1/admin/features/{id} - Delete feature

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    CourseFeature, CourseWithFeatures, CreateCourseInput, CreateFeatureInput, OrderItem,
    UpdateCourseInput, UpdateFeatureInput,
};
use crate::services::CourseServiceError;

/// Build the public course router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_courses))
        .route("/{id}", get(get_public_course))
}

/// Build the admin course router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_courses))
        .route("/", post(create_course))
        .route("/order", put(update_course_order))
        .route("/{id}", put(update_course))
        .route("/{id}", delete(delete_course))
        .route("/{id}/features", post(add_feature))
}

/// Build the admin feature router
pub fn admin_feature_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(update_feature))
        .route("/{id}", delete(delete_feature))
}

/// GET /api/v1/courses - List published courses
async fn list_public_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseWithFeatures>>, ApiError> {
    let courses = state
        .course_service
        .list_public()
        .await
        .map_err(map_course_error)?;
    Ok(Json(courses))
}

/// GET /api/v1/courses/{id} - Get one published course
///
/// Drafts return 404 on the public route.
async fn get_public_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseWithFeatures>, ApiError> {
    let course = state
        .course_service
        .get_public(id)
        .await
        .map_err(map_course_error)?;
    Ok(Json(course))
}

/// GET /api/v1/admin/courses - List all courses including drafts
async fn list_all_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseWithFeatures>>, ApiError> {
    let courses = state
        .course_service
        .list_all()
        .await
        .map_err(map_course_error)?;
    Ok(Json(courses))
}

/// POST /api/v1/admin/courses - Create a course
async fn create_course(
    State(state): State<AppState>,
    Json(body): Json<CreateCourseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .course_service
        .create(body)
        .await
        .map_err(map_course_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/courses/{id} - Update a course
async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCourseInput>,
) -> Result<Json<CourseWithFeatures>, ApiError> {
    let updated = state
        .course_service
        .update(id, body)
        .await
        .map_err(map_course_error)?;
    Ok(Json(updated))
}

/// Request body for bulk reordering
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub items: Vec<OrderItem>,
}

/// PUT /api/v1/admin/courses/order - Bulk display-order update
async fn update_course_order(
    State(state): State<AppState>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .course_service
        .update_order(body.items)
        .await
        .map_err(map_course_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/courses/{id} - Delete a course
async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .course_service
        .delete(id)
        .await
        .map_err(map_course_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/courses/{id}/features - Add a feature to a course
async fn add_feature(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CreateFeatureInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .course_service
        .add_feature(id, body)
        .await
        .map_err(map_course_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/features/{id} - Update a feature
async fn update_feature(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateFeatureInput>,
) -> Result<Json<CourseFeature>, ApiError> {
    let updated = state
        .course_service
        .update_feature(id, body)
        .await
        .map_err(map_course_error)?;
    Ok(Json(updated))
}

/// DELETE /api/v1/admin/features/{id} - Delete a feature
async fn delete_feature(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .course_service
        .delete_feature(id)
        .await
        .map_err(map_course_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_course_error(e: CourseServiceError) -> ApiError {
    match e {
        CourseServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CourseServiceError::NotFound => ApiError::not_found("Course not found"),
        CourseServiceError::FeatureNotFound => ApiError::not_found("Course feature not found"),
        CourseServiceError::SlugExists(slug) => {
            ApiError::conflict(format!("A course with slug '{}' already exists", slug))
        }
        CourseServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}
