//! Content sanitizers
//!
//! Unlike validation, sanitization always returns a usable value by
//! construction. The pipeline: strip NUL bytes, drop non-printable control
//! characters (keeping tab/LF/CR), apply the kind-specific transform, trim,
//! and truncate to the kind's maximum length.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static regex"));

static SCRIPT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?script[^>]*>").expect("static regex"));

static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bon\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("static regex")
});

static DANGEROUS_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(javascript|vbscript|data)\s*:").expect("static regex"));

static SQL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(union|select|insert|delete|drop)\b").expect("static regex")
});

/// Kinds of content accepted by [`sanitize_user_input`], each with its own
/// transform and maximum length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeKind {
    General,
    Search,
    Comment,
    Email,
}

impl SanitizeKind {
    fn max_len(self) -> usize {
        match self {
            SanitizeKind::General => 1000,
            SanitizeKind::Search => 200,
            SanitizeKind::Comment => 2000,
            SanitizeKind::Email => 254,
        }
    }
}

/// Coerce arbitrary input into a value safe to use. Never fails; for
/// `General` input the transform is idempotent.
pub fn sanitize_user_input(value: &str, kind: SanitizeKind) -> String {
    // NUL bytes and non-printable control characters (except tab/LF/CR)
    let cleaned: String = value
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || c >= '\u{20}')
        .collect();

    let transformed = match kind {
        SanitizeKind::General => cleaned,
        SanitizeKind::Search => {
            let no_sql = SQL_KEYWORD_RE.replace_all(&cleaned, "");
            no_sql.replace(['\'', '"', '`'], "")
        }
        SanitizeKind::Comment => html_escape(&cleaned),
        SanitizeKind::Email => cleaned.trim().to_lowercase(),
    };

    let trimmed = transformed.trim();
    truncate_chars(trimmed, kind.max_len())
}

fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Remove `<script>...</script>` blocks (multi-line, case-insensitive,
/// non-greedy) and any stray opening/closing script tags.
pub fn remove_script_tags(content: &str) -> String {
    let without_blocks = SCRIPT_BLOCK_RE.replace_all(content, "");
    SCRIPT_TAG_RE.replace_all(&without_blocks, "").into_owned()
}

/// Strip inline event-handler attributes and dangerous URL schemes
/// appearing as attribute values.
pub fn remove_dangerous_attributes(content: &str) -> String {
    let without_handlers = EVENT_ATTR_RE.replace_all(content, "");
    DANGEROUS_SCHEME_RE
        .replace_all(&without_handlers, "")
        .into_owned()
}
