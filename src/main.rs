//! Kursa - content backend for a training company marketing website

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kursa::{
    api::{self, AppState},
    cache::MemoryCache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxAdminUserRepository, SqlxCompanyRepository, SqlxCourseRepository,
            SqlxFileRepository, SqlxSectionRepository, SqlxSessionRepository,
            SqlxTeamMemberRepository, SqlxTestimonialRepository,
        },
    },
    services::{
        AuthService, CompanyService, CourseService, FileService, LoginRateLimiter,
        SectionService, TeamMemberService, TestimonialService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kursa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kursa backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Shared cache for hot public content
    let cache = Arc::new(MemoryCache::new());

    // Create repositories
    let user_repo = SqlxAdminUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let company_repo = SqlxCompanyRepository::boxed(pool.clone());
    let course_repo = SqlxCourseRepository::boxed(pool.clone());
    let team_repo = SqlxTeamMemberRepository::boxed(pool.clone());
    let testimonial_repo = SqlxTestimonialRepository::boxed(pool.clone());
    let section_repo = SqlxSectionRepository::boxed(pool.clone());
    let file_repo = SqlxFileRepository::boxed(pool.clone());

    // Initialize services
    let auth_service = Arc::new(AuthService::with_session_ttl(
        user_repo,
        session_repo,
        config.security.session_ttl_hours,
    ));
    let company_service = Arc::new(CompanyService::new(company_repo, cache.clone()));
    let course_service = Arc::new(CourseService::new(course_repo, cache.clone()));
    let team_service = Arc::new(TeamMemberService::new(team_repo, cache.clone()));
    let testimonial_service = Arc::new(TestimonialService::new(testimonial_repo, cache.clone()));
    let section_service = Arc::new(SectionService::new(section_repo, cache.clone()));
    let file_service = Arc::new(FileService::new(
        file_repo,
        Arc::new(config.upload.clone()),
    ));

    if !auth_service.has_admin().await? {
        tracing::info!("No admin account yet; POST /api/v1/auth/setup to create one");
    }

    let rate_limiter = Arc::new(LoginRateLimiter::new());

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        auth_service: auth_service.clone(),
        company_service,
        course_service,
        team_service,
        testimonial_service,
        section_service,
        file_service,
        rate_limiter: rate_limiter.clone(),
    };

    // Rate limiter cleanup task (every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Expired session cleanup task (hourly)
    {
        let auth = auth_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match auth.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired session(s)", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin, &config.upload.path);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
