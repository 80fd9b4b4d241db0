//! Company info API endpoints
//!
//! - GET /api/v1/company - Public company info
//! - PUT /api/v1/admin/company - Update company info

use axum::{extract::State, routing::get, routing::put, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CompanyInfo, UpdateCompanyInput};

/// Build the public company router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(get_company))
}

/// Build the admin company router
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", put(update_company))
}

/// GET /api/v1/company - Get company info
///
/// No authentication required.
async fn get_company(State(state): State<AppState>) -> Result<Json<CompanyInfo>, ApiError> {
    let info = state
        .company_service
        .get()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(info))
}

/// PUT /api/v1/admin/company - Update company info
///
/// Partial update: absent fields are left unchanged.
async fn update_company(
    State(state): State<AppState>,
    Json(body): Json<UpdateCompanyInput>,
) -> Result<Json<CompanyInfo>, ApiError> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation_error("Company name cannot be empty"));
        }
    }

    let updated = state
        .company_service
        .update(body)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(updated))
}
