//! Page content API endpoints (hero, footer)
//!
//! - GET /api/v1/content/hero - Public hero section
//! - GET /api/v1/content/footer - Public footer section
//! - PUT /api/v1/admin/content/hero - Replace hero section
//! - PUT /api/v1/admin/content/footer - Replace footer section

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{FooterContent, HeroContent};

/// Build the public content router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/hero", get(get_hero))
        .route("/footer", get(get_footer))
}

/// Build the admin content router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/hero", put(update_hero))
        .route("/footer", put(update_footer))
}

/// GET /api/v1/content/hero - Get the hero section
async fn get_hero(State(state): State<AppState>) -> Result<Json<HeroContent>, ApiError> {
    let hero = state
        .section_service
        .get_hero()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(hero))
}

/// PUT /api/v1/admin/content/hero - Replace the hero section
async fn update_hero(
    State(state): State<AppState>,
    Json(body): Json<HeroContent>,
) -> Result<Json<HeroContent>, ApiError> {
    state
        .section_service
        .update_hero(&body)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(body))
}

/// GET /api/v1/content/footer - Get the footer section
async fn get_footer(State(state): State<AppState>) -> Result<Json<FooterContent>, ApiError> {
    let footer = state
        .section_service
        .get_footer()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(footer))
}

/// PUT /api/v1/admin/content/footer - Replace the footer section
async fn update_footer(
    State(state): State<AppState>,
    Json(body): Json<FooterContent>,
) -> Result<Json<FooterContent>, ApiError> {
    state
        .section_service
        .update_footer(&body)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(body))
}
