//! Authentication API endpoints
//!
//! Handles HTTP requests for admin authentication:
//! - POST /api/v1/auth/setup - Create the first admin account
//! - POST /api/v1/auth/login - Admin login
//! - POST /api/v1/auth/logout - Admin logout
//! - GET /api/v1/auth/me - Get current admin
//! - GET /api/v1/auth/csrf - Get the session's CSRF token
//! - PUT /api/v1/auth/password - Change password
//! - GET /api/v1/auth/sessions - List active sessions
//! - DELETE /api/v1/auth/sessions/{id} - Terminate a session

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, CurrentSession};
use crate::models::Session;
use crate::services::auth::{AuthServiceError, LoginInput, RequestMeta, SetupInput};

/// Cookie lifetime advertised to the browser; the server-side expiry on
/// the session row is authoritative.
const COOKIE_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Request body for first-admin setup
#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AdminResponse,
    pub token: String,
    pub csrf_token: String,
}

/// Response for admin info
#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<crate::models::AdminUser> for AdminResponse {
    fn from(user: crate::models::AdminUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// One entry of the active-session listing
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
    pub expires_at: String,
    pub current: bool,
}

impl SessionResponse {
    fn from_session(session: Session, current_id: &str) -> Self {
        Self {
            current: session.id == current_id,
            id: session.id,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: session.created_at.to_rfc3339(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/setup", post(setup))
        .route("/login", post(login))
        .route("/has-admin", get(has_admin))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_admin))
        .route("/csrf", get(get_csrf_token))
        .route("/password", put(change_password))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{id}", delete(terminate_session))
}

/// Response for has-admin check
#[derive(Debug, Serialize)]
pub struct HasAdminResponse {
    pub has_admin: bool,
}

/// GET /api/v1/auth/has-admin - Check if an admin account exists
///
/// Used by the admin frontend's first-run setup flow.
async fn has_admin(State(state): State<AppState>) -> Result<Json<HasAdminResponse>, ApiError> {
    let has_admin = state
        .auth_service
        .has_admin()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(HasAdminResponse { has_admin }))
}

/// POST /api/v1/auth/setup - Create the first admin account
///
/// Returns 403 once an admin exists; there is no open registration.
async fn setup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SetupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth_service
        .setup(SetupInput {
            username: body.username.clone(),
            email: body.email,
            password: body.password.clone(),
        })
        .await
        .map_err(map_auth_error)?;

    // Log the fresh admin straight in
    let meta = request_meta(&headers);
    let session = state
        .auth_service
        .login(LoginInput::new(&user.username, &body.password), meta)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, session_cookie(&session.id));

    Ok((
        StatusCode::CREATED,
        response_headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
            csrf_token: session.csrf_token,
        }),
    ))
}

/// POST /api/v1/auth/login - Admin login
///
/// Rate limited per IP and per username; failed and successful attempts
/// are recorded to the login audit log.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let meta = request_meta(&headers);

    // IP rate limit (10 requests per minute)
    if let Some(ip) = meta.ip_address.as_ref().and_then(|s| s.parse().ok()) {
        if state.rate_limiter.is_ip_limited(ip).await {
            log_login_attempt(
                &state,
                &body.username_or_email,
                &meta,
                false,
                Some("IP rate limit exceeded"),
            )
            .await;
            return Err(ApiError::rate_limited("Too many requests, try again later", 60));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    // Username lockout (5 failed attempts per 15 minutes)
    if state
        .rate_limiter
        .is_username_limited(&body.username_or_email)
        .await
    {
        log_login_attempt(
            &state,
            &body.username_or_email,
            &meta,
            false,
            Some("Username rate limit exceeded"),
        )
        .await;
        return Err(ApiError::rate_limited(
            "Too many failed login attempts, try again in 15 minutes",
            900,
        ));
    }

    let input = LoginInput::new(body.username_or_email.clone(), body.password);
    let session = match state.auth_service.login(input, meta.clone()).await {
        Ok(session) => session,
        Err(e) => {
            state
                .rate_limiter
                .record_failed_attempt(&body.username_or_email)
                .await;
            let reason = match &e {
                AuthServiceError::AuthenticationError(_) => "Invalid credentials",
                _ => "Unknown error",
            };
            log_login_attempt(&state, &body.username_or_email, &meta, false, Some(reason)).await;

            return Err(match e {
                AuthServiceError::AuthenticationError(_) => {
                    ApiError::unauthorized("Invalid username or password")
                }
                _ => ApiError::internal_error("Login failed"),
            });
        }
    };

    let user = state
        .auth_service
        .validate_session(&session.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .map(|(user, _)| user)
        .ok_or_else(|| ApiError::internal_error("Session validation failed"))?;

    state
        .rate_limiter
        .clear_username_attempts(&body.username_or_email)
        .await;
    log_login_attempt(&state, &body.username_or_email, &meta, true, None).await;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, session_cookie(&session.id));

    Ok((
        response_headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
            csrf_token: session.csrf_token,
        }),
    ))
}

/// POST /api/v1/auth/logout - Terminate the current session
async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth_service
        .logout(&session.0.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    // Clear the session cookie
    let clear_cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";
    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, HeaderValue::from_static(clear_cookie));

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me - Get current admin
async fn get_current_admin(admin: AuthenticatedAdmin) -> Json<AdminResponse> {
    Json(admin.0.into())
}

/// Response for the CSRF token fetch
#[derive(Debug, Serialize)]
pub struct CsrfResponse {
    pub csrf_token: String,
}

/// GET /api/v1/auth/csrf - Get the current session's CSRF token
///
/// The admin frontend fetches this once after loading and attaches the
/// token to every state-changing request.
async fn get_csrf_token(session: CurrentSession) -> Json<CsrfResponse> {
    Json(CsrfResponse {
        csrf_token: session.0.csrf_token,
    })
}

/// Request body for changing password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/v1/auth/password - Change the current admin's password
///
/// Terminates the admin's other sessions; the current one stays valid.
async fn change_password(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    session: CurrentSession,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth_service
        .change_password(
            &admin.0,
            &session.0.id,
            &body.current_password,
            &body.new_password,
        )
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/sessions - List the admin's active sessions
async fn list_sessions(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    session: CurrentSession,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state
        .auth_service
        .list_sessions(admin.0.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(
        sessions
            .into_iter()
            .map(|s| SessionResponse::from_session(s, &session.0.id))
            .collect(),
    ))
}

/// DELETE /api/v1/auth/sessions/{id} - Terminate one of the admin's sessions
async fn terminate_session(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth_service
        .terminate_session(admin.0.id, &id)
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

fn map_auth_error(e: AuthServiceError) -> ApiError {
    match e {
        AuthServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        AuthServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        AuthServiceError::SetupClosed => {
            ApiError::forbidden("An administrator account already exists")
        }
        AuthServiceError::UserExists(msg) => ApiError::conflict(msg),
        AuthServiceError::NotFound(msg) => ApiError::not_found(msg),
        AuthServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// Build the session cookie (httpOnly for security)
fn session_cookie(token: &str) -> HeaderValue {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, COOKIE_MAX_AGE_SECONDS
    );
    // Token is a uuid and can't produce an invalid header value
    HeaderValue::from_str(&cookie).expect("valid cookie header")
}

/// Extract client metadata from request headers
///
/// Checks X-Forwarded-For and X-Real-IP for the IP (the service runs
/// behind a reverse proxy in production).
fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        });

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(String::from);

    RequestMeta {
        ip_address,
        user_agent,
    }
}

/// Record a login attempt in the audit log
async fn log_login_attempt(
    state: &AppState,
    username: &str,
    meta: &RequestMeta,
    success: bool,
    failure_reason: Option<&str>,
) {
    use crate::config::DatabaseDriver;

    let success_int = if success { 1 } else { 0 };
    let sql = "INSERT INTO login_logs (username, ip_address, user_agent, success, failure_reason) VALUES (?, ?, ?, ?, ?)";

    let result: Result<(), sqlx::Error> = match state.pool.driver() {
        DatabaseDriver::Sqlite => sqlx::query(sql)
            .bind(username)
            .bind(&meta.ip_address)
            .bind(&meta.user_agent)
            .bind(success_int)
            .bind(failure_reason)
            .execute(state.pool.as_sqlite().unwrap())
            .await
            .map(|_| ()),
        DatabaseDriver::Mysql => sqlx::query(sql)
            .bind(username)
            .bind(&meta.ip_address)
            .bind(&meta.user_agent)
            .bind(success_int)
            .bind(failure_reason)
            .execute(state.pool.as_mysql().unwrap())
            .await
            .map(|_| ()),
    };

    if let Err(e) = result {
        tracing::warn!("Failed to log login attempt: {}", e);
    }
}
