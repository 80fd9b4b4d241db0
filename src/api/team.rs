//! Team member API endpoints
//!
//! - GET /api/v1/team - Public team listing
//! - POST /api/v1/admin/team - Create team member
//! - PUT /api/v1/admin/team/order - Bulk display-order update
//! - PUT /api/v1/admin/team/{id} - Update team member
//! - DELETE /api/v1/admin/team/{id} - Delete team member

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateTeamMemberInput, OrderItem, TeamMember, UpdateTeamMemberInput};

/// Build the public team router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_team))
}

/// Build the admin team router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_member))
        .route("/order", put(update_team_order))
        .route("/{id}", put(update_member))
        .route("/{id}", delete(delete_member))
}

/// GET /api/v1/team - List team members
async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, ApiError> {
    let members = state
        .team_service
        .list()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(members))
}

/// POST /api/v1/admin/team - Create a team member
async fn create_member(
    State(state): State<AppState>,
    Json(body): Json<CreateTeamMemberInput>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::validation_error("Name cannot be empty"));
    }

    let created = state
        .team_service
        .create(body)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/team/{id} - Update a team member
async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTeamMemberInput>,
) -> Result<Json<TeamMember>, ApiError> {
    // Existence check first so a missing row maps to 404, not 500
    if state
        .team_service
        .get(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .is_none()
    {
        return Err(ApiError::not_found("Team member not found"));
    }

    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation_error("Name cannot be empty"));
        }
    }

    let updated = state
        .team_service
        .update(id, body)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(updated))
}

/// Request body for bulk reordering
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub items: Vec<OrderItem>,
}

/// PUT /api/v1/admin/team/order - Bulk display-order update
async fn update_team_order(
    State(state): State<AppState>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .team_service
        .update_order(body.items)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/team/{id} - Delete a team member
async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if state
        .team_service
        .get(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .is_none()
    {
        return Err(ApiError::not_found("Team member not found"));
    }

    state
        .team_service
        .delete(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
