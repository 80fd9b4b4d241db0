//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the Kursa backend:
//! - Public site API (company, courses, team, testimonials, content)
//! - Auth API (setup, login, sessions)
//! - Admin API (CRUD on all content, file management)
//! - Static serving of uploaded files

pub mod auth;
pub mod company;
pub mod content;
pub mod courses;
pub mod files;
pub mod middleware;
pub mod team;
pub mod testimonials;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedAdmin, CurrentSession, CSRF_HEADER};

/// Build the versioned API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes: authenticated, with CSRF protection on mutations
    let admin_routes = Router::new()
        .nest("/admin/company", company::admin_router())
        .nest("/admin/courses", courses::admin_router())
        .nest("/admin/features", courses::admin_feature_router())
        .nest("/admin/team", team::admin_router())
        .nest("/admin/testimonials", testimonials::admin_router())
        .nest("/admin/content", content::admin_router())
        .nest("/admin/files", files::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_csrf))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Session-scoped auth routes: authenticated, no CSRF layer. Logout and
    // session termination only act on the caller's own token; password
    // change re-verifies the current password.
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/company", company::public_router())
        .nest("/courses", courses::public_router())
        .nest("/team", team::public_router())
        .nest("/testimonials", testimonials::public_router())
        .nest("/content", content::public_router())
        .nest("/auth", auth::public_router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str, upload_path: &Path) -> Router {
    // CORS configuration - cookie auth needs credentials and an explicit origin
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::COOKIE,
            header::HeaderName::from_static(CSRF_HEADER),
        ])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        // Uploaded files are public
        .nest_service("/uploads", ServeDir::new(upload_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::UploadConfig;
    use crate::db::repositories::{
        SqlxAdminUserRepository, SqlxCompanyRepository, SqlxCourseRepository, SqlxFileRepository,
        SqlxSectionRepository, SqlxSessionRepository, SqlxTeamMemberRepository,
        SqlxTestimonialRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::services::{
        AuthService, CompanyService, CourseService, FileService, LoginRateLimiter, SectionService,
        TeamMemberService, TestimonialService,
    };
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    async fn test_server(upload_dir: &Path) -> TestServer {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let cache = Arc::new(MemoryCache::new());
        let upload_config = Arc::new(UploadConfig {
            path: upload_dir.to_path_buf(),
            ..Default::default()
        });

        let state = AppState {
            pool: pool.clone(),
            auth_service: Arc::new(AuthService::new(
                SqlxAdminUserRepository::boxed(pool.clone()),
                SqlxSessionRepository::boxed(pool.clone()),
            )),
            company_service: Arc::new(CompanyService::new(
                SqlxCompanyRepository::boxed(pool.clone()),
                cache.clone(),
            )),
            course_service: Arc::new(CourseService::new(
                SqlxCourseRepository::boxed(pool.clone()),
                cache.clone(),
            )),
            team_service: Arc::new(TeamMemberService::new(
                SqlxTeamMemberRepository::boxed(pool.clone()),
                cache.clone(),
            )),
            testimonial_service: Arc::new(TestimonialService::new(
                SqlxTestimonialRepository::boxed(pool.clone()),
                cache.clone(),
            )),
            section_service: Arc::new(SectionService::new(
                SqlxSectionRepository::boxed(pool.clone()),
                cache.clone(),
            )),
            file_service: Arc::new(FileService::new(
                SqlxFileRepository::boxed(pool.clone()),
                upload_config,
            )),
            rate_limiter: Arc::new(LoginRateLimiter::new()),
        };

        let app = build_router(state, "http://localhost:3000", upload_dir);
        TestServer::new(app).expect("Failed to build test server")
    }

    fn csrf_name() -> axum::http::HeaderName {
        axum::http::HeaderName::from_static(CSRF_HEADER)
    }

    fn csrf_value(value: &str) -> axum::http::HeaderValue {
        axum::http::HeaderValue::from_str(value).unwrap()
    }

    /// Run setup and return (token, csrf_token)
    async fn setup_admin(server: &TestServer) -> (String, String) {
        let response = server
            .post("/api/v1/auth/setup")
            .json(&json!({
                "username": "admin",
                "email": "admin@example.com",
                "password": "password123",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        (
            body["token"].as_str().unwrap().to_string(),
            body["csrf_token"].as_str().unwrap().to_string(),
        )
    }

    // ========================================================================
    // Public routes
    // ========================================================================

    #[tokio::test]
    async fn test_public_company_info() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;

        let response = server.get("/api/v1/company").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "Kursa Training");
    }

    #[tokio::test]
    async fn test_public_courses_empty() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;

        let response = server.get("/api/v1/courses").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_public_hero_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;

        let response = server.get("/api/v1/content/hero").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["title"], "");
    }

    // ========================================================================
    // Auth flow
    // ========================================================================

    #[tokio::test]
    async fn test_setup_then_login_flow() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;

        // Before setup
        let response = server.get("/api/v1/auth/has-admin").await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["has_admin"], false);

        setup_admin(&server).await;

        // Setup is now closed
        let response = server
            .post("/api/v1/auth/setup")
            .json(&json!({
                "username": "intruder",
                "email": "intruder@example.com",
                "password": "password123",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);

        // Login works
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({
                "username_or_email": "admin",
                "password": "password123",
            }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["user"]["username"], "admin");
        assert!(body["token"].as_str().is_some());
        assert!(body["csrf_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_401() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        setup_admin(&server).await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({
                "username_or_email": "admin",
                "password": "wrong-password",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_lockout_is_429() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        setup_admin(&server).await;

        // Burn through the 5-attempt username budget
        for _ in 0..5 {
            server
                .post("/api/v1/auth/login")
                .json(&json!({
                    "username_or_email": "admin",
                    "password": "wrong-password",
                }))
                .await;
        }

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({
                "username_or_email": "admin",
                "password": "password123",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], "RATE_LIMIT");
        assert_eq!(body["error"]["details"]["retry_after"], 900);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        setup_admin(&server).await;

        let response = server.get("/api/v1/auth/me").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_with_bearer_token() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, _) = setup_admin(&server).await;

        let response = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["username"], "admin");
        // The password hash must never leak
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, _) = setup_admin(&server).await;

        let response = server
            .post("/api/v1/auth/logout")
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        let response = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    // ========================================================================
    // CSRF enforcement
    // ========================================================================

    #[tokio::test]
    async fn test_admin_mutation_without_csrf_is_403() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, _) = setup_admin(&server).await;

        let response = server
            .put("/api/v1/admin/company")
            .authorization_bearer(&token)
            .json(&json!({"name": "New Name"}))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], "CSRF_MISMATCH");
    }

    #[tokio::test]
    async fn test_admin_mutation_with_wrong_csrf_is_403() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, _) = setup_admin(&server).await;

        let response = server
            .put("/api/v1/admin/company")
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value("not-the-nonce"))
            .json(&json!({"name": "New Name"}))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_mutation_with_csrf_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, csrf) = setup_admin(&server).await;

        let response = server
            .put("/api/v1/admin/company")
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .json(&json!({"name": "Acme Training"}))
            .await;
        response.assert_status_ok();

        // Visible on the public route
        let response = server.get("/api/v1/company").await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "Acme Training");
    }

    #[tokio::test]
    async fn test_admin_mutation_without_auth_is_401() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;

        let response = server
            .put("/api/v1/admin/company")
            .json(&json!({"name": "New Name"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    // ========================================================================
    // Course lifecycle over HTTP
    // ========================================================================

    #[tokio::test]
    async fn test_course_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, csrf) = setup_admin(&server).await;

        // Create a draft
        let response = server
            .post("/api/v1/admin/courses")
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .json(&json!({
                "title": "Rust for Beginners",
                "summary": "Three days of hands-on Rust",
                "duration": "3 days",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        let id = body["id"].as_i64().unwrap();
        assert_eq!(body["slug"], "rust-for-beginners");
        assert_eq!(body["published"], false);

        // Draft is invisible publicly
        let response = server.get(&format!("/api/v1/courses/{}", id)).await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);

        // Add a feature, publish
        let response = server
            .post(&format!("/api/v1/admin/courses/{}/features", id))
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .json(&json!({"label": "Hands-on labs"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .put(&format!("/api/v1/admin/courses/{}", id))
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .json(&json!({"published": true}))
            .await;
        response.assert_status_ok();

        // Now public, with its feature
        let response = server.get(&format!("/api/v1/courses/{}", id)).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["features"][0]["label"], "Hands-on labs");

        // Delete
        let response = server
            .delete(&format!("/api/v1/admin/courses/{}", id))
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        let response = server.get("/api/v1/courses").await;
        let body: serde_json::Value = response.json();
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_course_slug_is_409() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, csrf) = setup_admin(&server).await;

        for expected in [
            axum::http::StatusCode::CREATED,
            axum::http::StatusCode::CONFLICT,
        ] {
            let response = server
                .post("/api/v1/admin/courses")
                .authorization_bearer(&token)
                .add_header(csrf_name(), csrf_value(&csrf))
                .json(&json!({"title": "Rust for Beginners"}))
                .await;
            response.assert_status(expected);
        }
    }

    // ========================================================================
    // Testimonials and team over HTTP
    // ========================================================================

    #[tokio::test]
    async fn test_testimonial_validation_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, csrf) = setup_admin(&server).await;

        let response = server
            .post("/api/v1/admin/testimonials")
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .json(&json!({"author": "Dana", "quote": "Great", "rating": 7}))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_team_missing_member_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, csrf) = setup_admin(&server).await;

        let response = server
            .delete("/api/v1/admin/team/999")
            .authorization_bearer(&token)
            .add_header(csrf_name(), csrf_value(&csrf))
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    #[tokio::test]
    async fn test_session_listing_and_termination() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(dir.path()).await;
        let (token, _) = setup_admin(&server).await;

        // Second login from elsewhere
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({
                "username_or_email": "admin",
                "password": "password123",
            }))
            .await;
        let other: serde_json::Value = response.json();
        let other_token = other["token"].as_str().unwrap().to_string();

        // Both sessions visible, current flagged
        let response = server
            .get("/api/v1/auth/sessions")
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let sessions: serde_json::Value = response.json();
        let list = sessions.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.iter().filter(|s| s["current"] == true).count(),
            1
        );

        // Terminate the other session
        let response = server
            .delete(&format!("/api/v1/auth/sessions/{}", other_token))
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        let response = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&other_token)
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }
}
