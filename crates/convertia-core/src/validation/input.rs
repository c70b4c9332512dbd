//! Generic input validation for external fields
//!
//! Every query param, form field, and path segment coming from a client
//! passes through `validate_user_input`. Validation only classifies; it
//! never mutates and never panics. Universal injection checks run for
//! every kind, then kind-specific rules are applied on top.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum accepted length for any external field.
pub const MAX_INPUT_LEN: usize = 10_000;

/// Punctuation accepted as the "symbol" class for passwords.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

static SCRIPT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script").expect("static regex"));

static JS_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("static regex"));

static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon\w+\s*=").expect("static regex"));

static SQL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(union|select|insert|delete|drop)\b").expect("static regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("static regex")
});

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,30}$").expect("static regex"));

/// Kinds of external input, each with its own rules on top of the
/// universal injection checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    General,
    Email,
    Password,
    Username,
    Url,
    Search,
}

/// Outcome of validating one field.
#[derive(Debug, Clone)]
pub struct InputReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Validate one external field. Classification only: the value is never
/// modified, and every failed rule appends its own descriptive error.
pub fn validate_user_input(value: &str, kind: InputKind) -> InputReport {
    let mut errors = Vec::new();

    if value.is_empty() {
        errors.push("Value must not be empty".to_string());
    }

    if value.len() > MAX_INPUT_LEN {
        errors.push(format!(
            "Value exceeds maximum length of {} characters",
            MAX_INPUT_LEN
        ));
    }

    // Universal injection patterns, applied regardless of kind
    if SCRIPT_TAG_RE.is_match(value) {
        errors.push("Contains a script tag".to_string());
    }
    if JS_SCHEME_RE.is_match(value) {
        errors.push("Contains a javascript: URL scheme".to_string());
    }
    if EVENT_HANDLER_RE.is_match(value) {
        errors.push("Contains an inline event-handler attribute".to_string());
    }
    if SQL_KEYWORD_RE.is_match(value) {
        errors.push("Contains an SQL keyword".to_string());
    }
    if value.contains("||") || value.contains("&&") || value.contains(';') || value.contains('|') {
        errors.push("Contains shell metacharacters".to_string());
    }

    match kind {
        InputKind::General | InputKind::Search => {}
        InputKind::Email => validate_email(value, &mut errors),
        InputKind::Password => validate_password(value, &mut errors),
        InputKind::Username => validate_username(value, &mut errors),
        InputKind::Url => validate_url(value, &mut errors),
    }

    InputReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn validate_email(value: &str, errors: &mut Vec<String>) {
    if value.len() > 254 {
        errors.push("Email exceeds maximum length of 254 characters".to_string());
    }
    if !EMAIL_RE.is_match(value) {
        errors.push("Not a valid email address".to_string());
    }
}

fn validate_password(value: &str, errors: &mut Vec<String>) {
    let len = value.chars().count();
    if !(8..=128).contains(&len) {
        errors.push("Password must be between 8 and 128 characters".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain a lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain an uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }
    if !value.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push("Password must contain a symbol".to_string());
    }
}

fn validate_username(value: &str, errors: &mut Vec<String>) {
    if !USERNAME_RE.is_match(value) {
        errors.push(
            "Username must be 3-30 characters of letters, digits, underscore, or hyphen"
                .to_string(),
        );
    }
}

fn validate_url(value: &str, errors: &mut Vec<String>) {
    let lowered = value.trim().to_lowercase();

    // Dangerous schemes are rejected even when otherwise well-formed
    for scheme in ["javascript:", "data:", "vbscript:", "file:"] {
        if lowered.starts_with(scheme) {
            errors.push(format!("URL scheme '{}' is not allowed", scheme.trim_end_matches(':')));
            return;
        }
    }

    let rest = if let Some(rest) = lowered.strip_prefix("https://") {
        rest
    } else if let Some(rest) = lowered.strip_prefix("http://") {
        rest
    } else {
        errors.push("URL scheme must be http or https".to_string());
        return;
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.is_empty() {
        errors.push("URL must have a host".to_string());
    }
}
