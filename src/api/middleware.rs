//! API middleware
//!
//! Contains middleware for:
//! - Authentication (session token validation)
//! - CSRF protection on state-changing admin requests

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::models::{AdminUser, Session};
use crate::services::{
    AuthService, CompanyService, CourseService, FileService, LoginRateLimiter, SectionService,
    TeamMemberService, TestimonialService,
};

/// Name of the header carrying the per-session CSRF nonce
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub auth_service: Arc<AuthService>,
    pub company_service: Arc<CompanyService>,
    pub course_service: Arc<CourseService>,
    pub team_service: Arc<TeamMemberService>,
    pub testimonial_service: Arc<TestimonialService>,
    pub section_service: Arc<SectionService>,
    pub file_service: Arc<FileService>,
    pub rate_limiter: Arc<LoginRateLimiter>,
}

/// Authenticated admin extracted from the request
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub AdminUser);

/// The session the current request authenticated with
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn csrf_mismatch() -> Self {
        Self::new("CSRF_MISMATCH", "Missing or invalid CSRF token")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_seconds: u64) -> Self {
        Self::with_details(
            "RATE_LIMIT",
            message,
            serde_json::json!({ "retry_after": retry_after_seconds }),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" | "CSRF_MISMATCH" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMIT" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract session token from request headers
///
/// Prefers the Authorization bearer header, falls back to the `session`
/// cookie.
pub fn extract_session_token(headers: &header::HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
///
/// Validates the session token and stores the admin and session in the
/// request extensions for handlers and downstream middleware.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let (user, session) = state
        .auth_service
        .validate_session(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedAdmin(user));
    request.extensions_mut().insert(CurrentSession(session));
    Ok(next.run(request).await)
}

/// CSRF protection middleware
///
/// State-changing requests must carry the session's CSRF nonce in the
/// `X-CSRF-Token` header. Runs after `require_auth`. Safe methods pass
/// through untouched.
pub async fn require_csrf(request: Request, next: Next) -> Result<Response, ApiError> {
    if matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    ) {
        return Ok(next.run(request).await);
    }

    let session = request
        .extensions()
        .get::<CurrentSession>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let provided = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(ApiError::csrf_mismatch)?;

    if !csrf_token_matches(provided, &session.0.csrf_token) {
        return Err(ApiError::csrf_mismatch());
    }

    Ok(next.run(request).await)
}

/// Constant-time comparison of CSRF tokens
fn csrf_token_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

// ============================================================================
// Extractors
// ============================================================================

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .extensions
            .get::<AuthenticatedAdmin>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"));
        async move { result }
    }
}

impl<S> axum::extract::FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"));
        async move { result }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn headers_with_auth(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    fn headers_with_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("session={}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_session_token_from_bearer() {
        let headers = headers_with_auth("test-token-123");
        assert_eq!(
            extract_session_token(&headers),
            Some("test-token-123".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let headers = headers_with_cookie("test-token-456");
        assert_eq!(
            extract_session_token(&headers),
            Some("test-token-456".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_bearer_priority() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer bearer-token"),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("session=cookie-token"));
        assert_eq!(
            extract_session_token(&headers),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_from_multi_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok; lang=en"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok".to_string()));
    }

    #[test]
    fn test_extract_session_token_none() {
        let headers = HeaderMap::new();
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn test_extract_session_token_invalid_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn test_csrf_token_matches() {
        assert!(csrf_token_matches("abc123", "abc123"));
        assert!(!csrf_token_matches("abc123", "abc124"));
        assert!(!csrf_token_matches("abc", "abc123"));
        assert!(!csrf_token_matches("", "abc123"));
    }

    #[test]
    fn test_api_error_status_mapping() {
        let cases = [
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::csrf_mismatch(), StatusCode::FORBIDDEN),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::validation_error("x"), StatusCode::BAD_REQUEST),
            (ApiError::conflict("x"), StatusCode::CONFLICT),
            (
                ApiError::rate_limited("x", 60),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ApiError::internal_error("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let error = ApiError::rate_limited("slow down", 900);
        assert_eq!(error.error.details.unwrap()["retry_after"], 900);
    }
}
