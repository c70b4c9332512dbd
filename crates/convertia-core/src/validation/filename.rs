//! Filename sanitation and safety pre-checks
//!
//! Two policies exist because call sites need different behavior:
//! `is_filename_safe` rejects outright (the upload guard uses it to fail
//! closed before anything touches disk), while `sanitize_filename` coerces
//! any input into a storable name (used when deriving the stored name for
//! an admitted file).

use std::fmt;

/// Maximum byte length of a sanitized filename, extension included.
pub const MAX_SANITIZED_LEN: usize = 200;

/// Maximum byte length accepted by the strict pre-check.
pub const MAX_RAW_LEN: usize = 255;

/// Substituted when sanitation leaves nothing usable.
const PLACEHOLDER: &str = "unnamed_file";

/// Windows reserved device names; storing these breaks downstream tooling.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters invalid on Windows filesystems (plus path separators).
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A filename that is safe to store: no path separators, no control bytes,
/// not a reserved device name, non-empty, at most [`MAX_SANITIZED_LEN`]
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedFilename(String);

impl SanitizedFilename {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        match self.0.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < self.0.len() => {
                Some(self.0[idx + 1..].to_lowercase())
            }
            _ => None,
        }
    }
}

impl fmt::Display for SanitizedFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize an arbitrary user-supplied filename into a storable name.
///
/// Pure and infallible: always returns a usable name, falling back to a
/// placeholder when nothing survives sanitation.
pub fn sanitize_filename(raw: &str) -> SanitizedFilename {
    // Keep only the final path segment
    let name = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(raw);

    // Replace invalid characters and control bytes with underscores
    let mut cleaned: String = name
        .chars()
        .map(|c| {
            if c < '\u{20}' || INVALID_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Reserved device names get a prefix rather than a rejection
    let stem = cleaned.split('.').next().unwrap_or("").to_uppercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        cleaned = format!("safe_{}", cleaned);
    }

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        return SanitizedFilename(PLACEHOLDER.to_string());
    }

    SanitizedFilename(truncate_keeping_extension(trimmed, MAX_SANITIZED_LEN))
}

/// Truncate the stem (not the extension) so the total byte length fits,
/// always cutting on a char boundary.
fn truncate_keeping_extension(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };

    // Degenerate case: the extension alone does not fit
    if ext.len() >= max_len {
        return truncate_on_char_boundary(name, max_len);
    }

    let stem_budget = max_len - ext.len();
    let mut result = truncate_on_char_boundary(stem, stem_budget);
    if result.is_empty() {
        result.push('_');
    }
    result.push_str(ext);
    result
}

fn truncate_on_char_boundary(s: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(max_len.min(s.len()));
    for c in s.chars() {
        if out.len() + c.len_utf8() > max_len {
            break;
        }
        out.push(c);
    }
    out
}

/// Strict pre-check: returns false for any name the platform should refuse
/// outright instead of renaming. Fail-closed companion to
/// [`sanitize_filename`].
pub fn is_filename_safe(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > MAX_RAW_LEN {
        return false;
    }

    if raw.contains("../") || raw.contains('/') || raw.contains('\\') {
        return false;
    }

    if raw.chars().any(|c| c < '\u{20}' || INVALID_CHARS.contains(&c)) {
        return false;
    }

    if raw.starts_with('.') || raw.ends_with('.') || raw.ends_with(' ') {
        return false;
    }

    let stem = raw.split('.').next().unwrap_or("").to_uppercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_str(), "passwd");
        assert_eq!(
            sanitize_filename("..\\..\\windows\\boot.ini").as_str(),
            "boot.ini"
        );
        assert_eq!(sanitize_filename("/var/tmp/report.pdf").as_str(), "report.pdf");
    }

    #[test]
    fn test_sanitize_replaces_invalid_characters() {
        assert_eq!(sanitize_filename("a<b>c:d.txt").as_str(), "a_b_c_d.txt");
        assert_eq!(sanitize_filename("file\u{0}\u{1}.txt").as_str(), "file__.txt");
    }

    #[test]
    fn test_sanitize_never_contains_separators_or_control_bytes() {
        let cases = [
            "../../etc/passwd",
            "a/b\\c",
            "nul\u{0}.pdf",
            "...",
            "",
            "CON.txt",
        ];
        for raw in cases {
            let name = sanitize_filename(raw);
            assert!(!name.as_str().is_empty(), "empty output for {:?}", raw);
            assert!(name.as_str().len() <= MAX_SANITIZED_LEN);
            assert!(!name.as_str().contains('/'));
            assert!(!name.as_str().contains('\\'));
            assert!(name.as_str().chars().all(|c| c >= '\u{20}'));
        }
    }

    #[test]
    fn test_sanitize_reserved_device_names() {
        assert_eq!(sanitize_filename("CON.txt").as_str(), "safe_CON.txt");
        assert_eq!(sanitize_filename("com1.pdf").as_str(), "safe_com1.pdf");
        // Not reserved: stem differs
        assert_eq!(sanitize_filename("CONSOLE.txt").as_str(), "CONSOLE.txt");
    }

    #[test]
    fn test_sanitize_empty_falls_back_to_placeholder() {
        assert_eq!(sanitize_filename("").as_str(), "unnamed_file");
        assert_eq!(sanitize_filename("  ...  ").as_str(), "unnamed_file");
        assert_eq!(sanitize_filename("..").as_str(), "unnamed_file");
    }

    #[test]
    fn test_sanitize_truncates_stem_not_extension() {
        let long = format!("{}.pdf", "a".repeat(300));
        let name = sanitize_filename(&long);
        assert_eq!(name.as_str().len(), MAX_SANITIZED_LEN);
        assert!(name.as_str().ends_with(".pdf"));
    }

    #[test]
    fn test_sanitize_truncation_respects_char_boundaries() {
        let long = format!("{}.txt", "é".repeat(200));
        let name = sanitize_filename(&long);
        assert!(name.as_str().len() <= MAX_SANITIZED_LEN);
        assert!(name.as_str().ends_with(".txt"));
    }

    #[test]
    fn test_extension_accessor() {
        assert_eq!(
            sanitize_filename("Report.PDF").extension(),
            Some("pdf".to_string())
        );
        assert_eq!(sanitize_filename("README").extension(), None);
    }

    #[test]
    fn test_pre_check_rejects_traversal() {
        assert!(!is_filename_safe("../../etc/passwd.pdf"));
        assert!(!is_filename_safe("..\\config.sys"));
        assert!(!is_filename_safe("dir/file.txt"));
    }

    #[test]
    fn test_pre_check_rejects_windows_specials() {
        assert!(!is_filename_safe("a<b.txt"));
        assert!(!is_filename_safe("a|b.txt"));
        assert!(!is_filename_safe("CON.txt"));
        assert!(!is_filename_safe(".hidden"));
        assert!(!is_filename_safe("trailing."));
        assert!(!is_filename_safe("trailing "));
        assert!(!is_filename_safe(""));
        assert!(!is_filename_safe(&"a".repeat(256)));
    }

    #[test]
    fn test_pre_check_accepts_ordinary_names() {
        assert!(is_filename_safe("report.pdf"));
        assert!(is_filename_safe("photo_2024-01-02.jpeg"));
        assert!(is_filename_safe("Data (final).xlsx"));
    }
}
