//! Error types module
//!
//! This module provides the core error types used throughout the Convertia
//! application. All errors are unified under the `AppError` enum, which
//! covers policy violations (rate limits, disallowed types, oversized
//! files), content threats, and internal failures.
//!
//! Content threats are marked sensitive: clients receive a generic message
//! while the specific detector detail goes only to the server log.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for policy violations and detected threats
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "RATE_LIMITED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Unsafe filename: {0}")]
    UnsafeFilename(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Account locked, {remaining_secs}s remaining: {reason}")]
    AccountLocked {
        remaining_secs: u64,
        reason: String,
    },

    /// A blocking content-security finding. The string carries the full
    /// detector detail for the server log; clients only ever see the
    /// generic `client_message`.
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

// Error conversion implementations following Rust best practices
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidFileType(_) => (
            400,
            "INVALID_FILE_TYPE",
            false,
            Some("Upload one of the accepted file types for this endpoint"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsafeFilename(_) => (
            400,
            "UNSAFE_FILENAME",
            false,
            Some("Rename the file without path separators or special characters"),
            false,
            LogLevel::Warn,
        ),
        AppError::RateLimited { .. } => (
            429,
            "RATE_LIMITED",
            true,
            Some("Wait for the Retry-After interval and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::AccountLocked { .. } => (
            429,
            "ACCOUNT_LOCKED",
            true,
            Some("Wait for the lockout to expire before retrying"),
            false,
            LogLevel::Warn,
        ),
        AppError::SecurityViolation(_) => (
            403,
            "SECURITY_VIOLATION",
            false,
            None,
            true,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check authentication credentials"),
            false,
            LogLevel::Debug,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::InvalidFileType(_) => "InvalidFileType",
            AppError::UnsafeFilename(_) => "UnsafeFilename",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::AccountLocked { .. } => "AccountLocked",
            AppError::SecurityViolation(_) => "SecurityViolation",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::Unauthorized(_) => "Unauthorized",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        // Add source error chain
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// Retry-After value in seconds, for variants that carry one.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AppError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            AppError::AccountLocked { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::InvalidFileType(ref msg) => msg.clone(),
            AppError::UnsafeFilename(_) => "Filename is not acceptable".to_string(),
            AppError::RateLimited { .. } => "Too many requests. Please slow down.".to_string(),
            AppError::AccountLocked { remaining_secs, .. } => {
                format!("Account temporarily locked. Try again in {}s.", remaining_secs)
            }
            // Never reveal which detector fired; probing uploads must not
            // learn the rule set.
            AppError::SecurityViolation(_) => "File failed security validation".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
            AppError::Unauthorized(ref msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_violation_is_generic_to_clients() {
        let err = AppError::SecurityViolation("PDF contains /JavaScript".to_string());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "File failed security validation");
        // Full detail still available for server logs
        assert!(err.detailed_message().contains("/JavaScript"));
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AppError::RateLimited {
                retry_after_secs: 30
            }
            .http_status_code(),
            429
        );
        assert_eq!(
            AppError::PayloadTooLarge("too big".into()).http_status_code(),
            413
        );
        assert_eq!(
            AppError::InvalidFileType("exe".into()).http_status_code(),
            400
        );
        assert_eq!(
            AppError::SecurityViolation("x".into()).http_status_code(),
            403
        );
    }

    #[test]
    fn test_retry_after_secs() {
        assert_eq!(
            AppError::RateLimited {
                retry_after_secs: 42
            }
            .retry_after_secs(),
            Some(42)
        );
        assert_eq!(AppError::BadRequest("x".into()).retry_after_secs(), None);
    }
}
