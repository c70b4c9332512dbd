//! Convertia Infrastructure Library
//!
//! Shared infrastructure used by the API boundary:
//! - Middleware (request ID, security headers)
//! - Rate limiting and login-attempt tracking
//! - Telemetry initialization

pub mod middleware;
pub mod rate_limit;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{request_id_middleware, security_headers_middleware, RequestId};
pub use rate_limit::{HttpRateLimiter, LockoutStatus, LoginAttemptTracker};
pub use telemetry::{init_telemetry, shutdown_telemetry};
