//! In-memory rate limiting and login-attempt tracking.
//!
//! Both stores are process-local by design: this subsystem carries no
//! network dependencies, so limits apply per instance.

pub mod limiter;
pub mod login_tracker;

pub use limiter::HttpRateLimiter;
pub use login_tracker::{LockoutStatus, LoginAttemptTracker};
