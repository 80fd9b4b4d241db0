//! Authentication service
//!
//! Implements business logic for admin authentication:
//! - First-admin setup (registration stays closed afterwards)
//! - Login/logout with session token issuance
//! - Session validation with sliding renewal
//! - CSRF nonce management (one nonce per session)
//! - Password change with termination of other sessions

use crate::db::repositories::{AdminUserRepository, SessionRepository};
use crate::models::{AdminUser, Session};
use crate::services::password::{hash_password, verify_password};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session lifetime in hours
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Setup is closed because an admin already exists
    #[error("Setup is closed: an administrator account already exists")]
    SetupClosed,

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Requested entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Request metadata recorded on sessions and login logs
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Input for first-admin setup
#[derive(Debug, Clone)]
pub struct SetupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Input for login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

/// Authentication service for admin users and sessions
pub struct AuthService {
    user_repo: Arc<dyn AdminUserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a new auth service with the default session lifetime
    pub fn new(
        user_repo: Arc<dyn AdminUserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_ttl(user_repo, session_repo, DEFAULT_SESSION_TTL_HOURS)
    }

    /// Create a new auth service with a custom session lifetime in hours
    pub fn with_session_ttl(
        user_repo: Arc<dyn AdminUserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// Check whether an admin account exists yet
    pub async fn has_admin(&self) -> Result<bool, AuthServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count admin users")?;
        Ok(count > 0)
    }

    /// Create the first administrator account.
    ///
    /// Fails with `SetupClosed` once any admin exists; there is no open
    /// registration on this system.
    pub async fn setup(&self, input: SetupInput) -> Result<AdminUser, AuthServiceError> {
        if self.has_admin().await? {
            return Err(AuthServiceError::SetupClosed);
        }

        self.validate_setup_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(AuthServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = AdminUser::new(input.username, input.email, password_hash);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create admin user")?;

        Ok(created)
    }

    /// Login with credentials.
    ///
    /// Validates credentials and issues a new session carrying a fresh
    /// CSRF nonce and the client's IP/user agent.
    pub async fn login(
        &self,
        input: LoginInput,
        meta: RequestMeta,
    ) -> Result<Session, AuthServiceError> {
        let user = self
            .find_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(|| {
                AuthServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(AuthServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        self.create_session(user.id, meta).await
    }

    /// Logout (terminate the session)
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token and return the associated user and session.
    ///
    /// Expired sessions are removed and treated as absent. Valid sessions
    /// whose remaining lifetime has dropped below half the TTL get their
    /// expiry pushed forward by a full TTL (sliding renewal).
    pub async fn validate_session(
        &self,
        token: &str,
    ) -> Result<Option<(AdminUser, Session)>, AuthServiceError> {
        let mut session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            // Clean up the expired row; the caller just sees no session
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        if session.remaining() < self.session_ttl / 2 {
            let new_expiry = Utc::now() + self.session_ttl;
            self.session_repo
                .set_expiry(token, new_expiry)
                .await
                .context("Failed to renew session")?;
            session.expires_at = new_expiry;
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.map(|u| (u, session)))
    }

    /// List all sessions of a user, newest first
    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<Session>, AuthServiceError> {
        let sessions = self
            .session_repo
            .list_by_user(user_id)
            .await
            .context("Failed to list sessions")?;
        Ok(sessions)
    }

    /// Terminate one of the user's own sessions.
    ///
    /// Fails with `NotFound` when the session doesn't exist or belongs to
    /// a different user; the caller can't probe other users' tokens.
    pub async fn terminate_session(
        &self,
        user_id: i64,
        session_id: &str,
    ) -> Result<(), AuthServiceError> {
        let session = self
            .session_repo
            .get_by_id(session_id)
            .await
            .context("Failed to get session")?;

        match session {
            Some(s) if s.user_id == user_id => {
                self.session_repo
                    .delete(session_id)
                    .await
                    .context("Failed to delete session")?;
                Ok(())
            }
            _ => Err(AuthServiceError::NotFound("Session not found".to_string())),
        }
    }

    /// Change a user's password.
    ///
    /// Re-verifies the current password, stores the new hash, and
    /// terminates the user's other sessions (keeping the current one).
    pub async fn change_password(
        &self,
        user: &AdminUser,
        current_session_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        if new_password.len() < 8 {
            return Err(AuthServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let is_valid = verify_password(current_password, &user.password_hash)
            .context("Failed to verify password")?;
        if !is_valid {
            return Err(AuthServiceError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut updated = user.clone();
        updated.password_hash =
            hash_password(new_password).context("Failed to hash password")?;

        self.user_repo
            .update(&updated)
            .await
            .context("Failed to update user")?;

        self.session_repo
            .delete_by_user_except(user.id, current_session_id)
            .await
            .context("Failed to terminate other sessions")?;

        Ok(())
    }

    /// Delete all expired sessions.
    ///
    /// Maintenance operation called periodically from a background task.
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, AuthServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(count)
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn validate_setup_input(&self, input: &SetupInput) -> Result<(), AuthServiceError> {
        if input.username.trim().is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }

        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(AuthServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }

        if input.password.len() < 8 {
            return Err(AuthServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        Ok(())
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<AdminUser>, AuthServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        let user = self
            .user_repo
            .get_by_email(username_or_email)
            .await
            .context("Failed to get user by email")?;

        Ok(user)
    }

    async fn create_session(
        &self,
        user_id: i64,
        meta: RequestMeta,
    ) -> Result<Session, AuthServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            csrf_token: Uuid::new_v4().to_string(),
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
            expires_at: now + self.session_ttl,
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::db::repositories::{SqlxAdminUserRepository, SqlxSessionRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::services::password::{hash_password, verify_password};
    use proptest::prelude::*;

    async fn setup_property_test_service() -> AuthService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxAdminUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        AuthService::new(user_repo, session_repo)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Authentication roundtrip: for any valid credentials, login
        /// returns a token that validates back to the same admin.
        #[test]
        fn auth_roundtrip(
            username in "[a-z]{3,10}",
            email_prefix in "[a-z]{3,10}",
            password in "[a-zA-Z0-9!@#$%^&*]{8,20}"
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let service = setup_property_test_service().await;

                let admin = service.setup(SetupInput {
                    username: username.clone(),
                    email: format!("{}@example.com", email_prefix),
                    password: password.clone(),
                }).await.expect("Setup should succeed");

                let session = service
                    .login(LoginInput::new(username.clone(), password.clone()), RequestMeta::default())
                    .await
                    .expect("Login should succeed with valid credentials");

                let (user, validated) = service
                    .validate_session(&session.id)
                    .await
                    .expect("Session validation should not error")
                    .expect("Session should be valid");

                prop_assert_eq!(user.id, admin.id);
                prop_assert_eq!(user.username, admin.username);
                prop_assert_eq!(validated.csrf_token, session.csrf_token);
                Ok(())
            });
            result?;
        }

        /// Password secure storage: the stored hash differs from the
        /// plaintext, only the original password verifies, and two hashes
        /// of the same password differ (random salt).
        #[test]
        fn password_secure_storage(
            password in "[a-zA-Z0-9!@#$%^&*()_+-=]{1,50}"
        ) {
            let hash = hash_password(&password).expect("Password hashing should succeed");

            prop_assert_ne!(&hash, &password, "Hash must differ from original password");
            prop_assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
            prop_assert!(hash.len() > 80, "Hash should have sufficient length");

            let verify_result = verify_password(&password, &hash)
                .expect("Password verification should not error");
            prop_assert!(verify_result, "Correct password should verify");

            let wrong_password = format!("{}wrong", password);
            let wrong_verify_result = verify_password(&wrong_password, &hash)
                .expect("Password verification should not error");
            prop_assert!(!wrong_verify_result, "Wrong password should not verify");

            let hash2 = hash_password(&password).expect("Second hashing should succeed");
            prop_assert_ne!(&hash, &hash2, "Same password should produce different hashes");
        }

        /// Invalid credentials rejection: wrong passwords and unknown
        /// usernames both fail with an authentication error.
        #[test]
        fn invalid_credentials_rejected(
            username in "[a-z]{3,10}",
            correct_password in "[a-zA-Z0-9]{8,20}",
            wrong_password in "[a-zA-Z0-9]{8,20}",
        ) {
            prop_assume!(correct_password != wrong_password);

            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let service = setup_property_test_service().await;

                service.setup(SetupInput {
                    username: username.clone(),
                    email: format!("{}@example.com", username),
                    password: correct_password.clone(),
                }).await.expect("Setup should succeed");

                let wrong = service
                    .login(LoginInput::new(username.clone(), wrong_password.clone()), RequestMeta::default())
                    .await;
                prop_assert!(
                    matches!(wrong, Err(AuthServiceError::AuthenticationError(_))),
                    "Wrong password should return AuthenticationError"
                );

                let unknown = service
                    .login(LoginInput::new(format!("nx_{}", username), correct_password.clone()), RequestMeta::default())
                    .await;
                prop_assert!(
                    matches!(unknown, Err(AuthServiceError::AuthenticationError(_))),
                    "Unknown username should return AuthenticationError"
                );
                Ok(())
            });
            result?;
        }
    }
}
