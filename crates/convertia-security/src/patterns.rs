//! Shared byte-pattern tables used by the content and embedded scanners.

use regex::bytes::Regex;
use std::sync::LazyLock;

/// Magic-number prefixes of executable container formats.
///
/// Matched anywhere in a payload by the embedded scanner, and against the
/// start of base64-decoded candidates.
pub const EXECUTABLE_SIGNATURES: &[(&str, &[u8])] = &[
    ("windows executable", b"MZ"),
    ("ELF binary", b"\x7fELF"),
    ("Mach-O binary (32-bit)", b"\xfe\xed\xfa\xce"),
    ("Mach-O binary (64-bit)", b"\xfe\xed\xfa\xcf"),
    ("Mach-O universal binary", b"\xca\xfe\xba\xbe"),
    ("shell script", b"#!"),
    ("WebAssembly module", b"\x00asm"),
];

/// Markers of a VBA macro project inside an Office container.
pub const OFFICE_MACRO_MARKERS: &[&[u8]] = &[
    b"vbaProject",
    b"macros/",
    b"xl/vbaProject",
    b"word/vbaProject",
    b"ppt/vbaProject",
];

/// Content-type declarations that indicate an embedded executable object.
pub const OFFICE_EMBEDDED_EXEC_MARKERS: &[&[u8]] = &[
    b"application/x-msdownload",
    b"application/octet-stream",
];

/// Indicators of external data-connection definitions. Individually these
/// appear in benign workbooks; two or more distinct indicators together
/// mark a refresh-on-open exfiltration vector.
pub const OFFICE_EXTERNAL_CONN_MARKERS: &[&[u8]] = &[
    b"<Connection ",
    b"external=\"1\"",
    b"refreshedVersion=",
];

/// Script and server-side code fragments that have no business inside an
/// uploaded document of unknown format.
pub const DANGEROUS_TEXT_PATTERNS: &[(&str, &[u8])] = &[
    ("script tag", b"<script"),
    ("javascript scheme", b"javascript:"),
    ("vbscript scheme", b"vbscript:"),
    ("base64 html payload", b"data:text/html;base64"),
    ("php tag", b"<?php"),
    ("server-side template tag", b"<%"),
    ("eval call", b"eval("),
    ("exec call", b"exec("),
    ("system call", b"system("),
    ("shell_exec call", b"shell_exec("),
];

/// Runs of base64 alphabet long enough to plausibly carry a hidden payload.
pub static BASE64_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9+/]{50,}={0,2}").expect("static regex")
});

/// Case-insensitive byte-substring search.
pub fn contains_bytes_ci(data: &[u8], pattern: &[u8]) -> bool {
    if pattern.is_empty() || data.len() < pattern.len() {
        return pattern.is_empty();
    }
    data.windows(pattern.len()).any(|w| w.eq_ignore_ascii_case(pattern))
}

/// Case-sensitive byte-substring search.
pub fn contains_bytes(data: &[u8], pattern: &[u8]) -> bool {
    if pattern.is_empty() || data.len() < pattern.len() {
        return pattern.is_empty();
    }
    data.windows(pattern.len()).any(|w| w == pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_bytes_ci() {
        assert!(contains_bytes_ci(b"xx<SCRIPT>alert(1)</script>", b"<script"));
        assert!(contains_bytes_ci(b"JavaScript: void(0)", b"javascript:"));
        assert!(!contains_bytes_ci(b"scrip", b"<script"));
    }

    #[test]
    fn test_contains_bytes_exact() {
        assert!(contains_bytes(b"word/vbaProject.bin", b"word/vbaProject"));
        assert!(!contains_bytes(b"word/VBAPROJECT.bin", b"word/vbaProject"));
    }

    #[test]
    fn test_base64_run_regex() {
        let run = "A".repeat(60);
        assert!(BASE64_RUN_RE.is_match(run.as_bytes()));
        let short = "A".repeat(40);
        assert!(!BASE64_RUN_RE.is_match(short.as_bytes()));
    }

    #[test]
    fn test_executable_signatures_present() {
        assert!(EXECUTABLE_SIGNATURES.iter().any(|(_, sig)| *sig == b"MZ"));
        assert!(EXECUTABLE_SIGNATURES.iter().any(|(_, sig)| *sig == b"\x7fELF"));
    }
}
