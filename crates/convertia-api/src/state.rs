//! Shared application state.

use std::sync::Arc;

use convertia_core::Config;
use convertia_infra::{HttpRateLimiter, LoginAttemptTracker};

use crate::auth::CredentialVerifier;

/// Process-wide services handed to every handler.
///
/// The limiter and tracker are explicit members here rather than globals:
/// tests construct isolated instances, and everything a handler can touch
/// is visible at the construction site.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rate_limiter: Arc<HttpRateLimiter>,
    pub login_tracker: Arc<LoginAttemptTracker>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(config: Config, credentials: Arc<dyn CredentialVerifier>) -> Self {
        let rate_limiter = Arc::new(HttpRateLimiter::new(config.http_rate_limit_per_minute));
        let login_tracker = Arc::new(LoginAttemptTracker::new(
            config.max_failed_login_attempts,
            config.lockout_base_secs,
            config.lockout_cap_secs,
        ));
        Self {
            config: Arc::new(config),
            rate_limiter,
            login_tracker,
            credentials,
        }
    }
}
