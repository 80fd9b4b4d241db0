//! Rate limiter for login attempts
//!
//! Provides protection against brute force attacks by:
//! - Limiting failed login attempts per username (5 attempts per 15 minutes)
//! - Limiting login requests per IP address (10 requests per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::sync::RwLock;

/// Maximum failed attempts per username inside the lockout window
const MAX_USERNAME_ATTEMPTS: usize = 5;
/// Lockout window for username attempts
const USERNAME_WINDOW_MINUTES: i64 = 15;
/// Maximum login requests per IP inside the window
const MAX_IP_REQUESTS: usize = 10;
/// Window for IP request counting
const IP_WINDOW_MINUTES: i64 = 1;

/// Login rate limiter
pub struct LoginRateLimiter {
    /// Failed login attempts by username
    username_attempts: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    /// Login requests by IP address
    ip_attempts: RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>,
}

impl LoginRateLimiter {
    /// Create a new rate limiter
    pub fn new() -> Self {
        Self {
            username_attempts: RwLock::new(HashMap::new()),
            ip_attempts: RwLock::new(HashMap::new()),
        }
    }

    /// Check if a username is locked out
    pub async fn is_username_limited(&self, username: &str) -> bool {
        let mut attempts = self.username_attempts.write().await;
        let cutoff = Utc::now() - Duration::minutes(USERNAME_WINDOW_MINUTES);

        let username_attempts = attempts.entry(username.to_lowercase()).or_default();
        username_attempts.retain(|time| *time > cutoff);

        username_attempts.len() >= MAX_USERNAME_ATTEMPTS
    }

    /// Record a failed login attempt for a username
    pub async fn record_failed_attempt(&self, username: &str) {
        let mut attempts = self.username_attempts.write().await;
        attempts
            .entry(username.to_lowercase())
            .or_default()
            .push(Utc::now());
    }

    /// Clear failed attempts for a username (on successful login)
    pub async fn clear_username_attempts(&self, username: &str) {
        let mut attempts = self.username_attempts.write().await;
        attempts.remove(&username.to_lowercase());
    }

    /// Check if an IP is rate limited
    pub async fn is_ip_limited(&self, ip: IpAddr) -> bool {
        let mut attempts = self.ip_attempts.write().await;
        let cutoff = Utc::now() - Duration::minutes(IP_WINDOW_MINUTES);

        let ip_attempts = attempts.entry(ip).or_default();
        ip_attempts.retain(|time| *time > cutoff);

        ip_attempts.len() >= MAX_IP_REQUESTS
    }

    /// Record a login request from an IP
    pub async fn record_ip_request(&self, ip: IpAddr) {
        let mut attempts = self.ip_attempts.write().await;
        attempts.entry(ip).or_default().push(Utc::now());
    }

    /// Clean up stale entries (called periodically from a background task)
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let username_cutoff = now - Duration::minutes(USERNAME_WINDOW_MINUTES);
        let ip_cutoff = now - Duration::minutes(IP_WINDOW_MINUTES);

        {
            let mut attempts = self.username_attempts.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > username_cutoff);
                !times.is_empty()
            });
        }

        {
            let mut attempts = self.ip_attempts.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > ip_cutoff);
                !times.is_empty()
            });
        }
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
