//! Embedded payload detection.
//!
//! Looks past the declared format for signs of a second file hiding inside
//! the first: executable magic numbers appearing mid-stream, and long
//! base64 runs that decode to executable or script content. Runs against
//! the file on disk so oversized uploads never get a second in-memory copy.

use std::fs;
use std::path::Path;

use base64::Engine;
use tracing::debug;

use convertia_core::{SourceCheck, ValidationResult};

use crate::patterns::{
    contains_bytes_ci, BASE64_RUN_RE, DANGEROUS_TEXT_PATTERNS, EXECUTABLE_SIGNATURES,
};

/// Legitimate container formats open with magic of their own, so signature
/// scanning only starts past the file's declared header region.
const HEADER_SKIP: usize = 100;

/// At most this many base64 runs are decoded per file. Base64 runs are
/// common in legitimate documents (embedded fonts, images) and decoding is
/// the expensive part of this scan.
pub const MAX_BASE64_CANDIDATES: usize = 5;

/// Scan the file at `path` for payloads hidden inside the declared format.
pub fn scan_for_embedded_files(path: &Path) -> ValidationResult {
    let mut result = ValidationResult::new();

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read file for embedded scan");
            result.push_warning(
                SourceCheck::EmbeddedPayload,
                "Could not read file for embedded payload scan",
            );
            return result;
        }
    };

    scan_signatures(&data, &mut result);
    scan_base64_runs(&data, &mut result);
    result
}

fn scan_signatures(data: &[u8], result: &mut ValidationResult) {
    let body = if data.len() > HEADER_SKIP {
        &data[HEADER_SKIP..]
    } else {
        return;
    };

    for (name, signature) in EXECUTABLE_SIGNATURES {
        if body
            .windows(signature.len())
            .any(|window| window == *signature)
        {
            result.push_blocking(
                SourceCheck::EmbeddedPayload,
                format!("Embedded {name} signature found past file header"),
            );
        }
    }
}

fn scan_base64_runs(data: &[u8], result: &mut ValidationResult) {
    let engine = base64::engine::general_purpose::STANDARD;

    for run in BASE64_RUN_RE.find_iter(data).take(MAX_BASE64_CANDIDATES) {
        // Undecodable runs (wrong padding, line-wrapped blobs) are just
        // noise, not evidence.
        let Ok(decoded) = engine.decode(run.as_bytes()) else {
            continue;
        };

        for (name, signature) in EXECUTABLE_SIGNATURES {
            if decoded.starts_with(signature) {
                result.push_blocking(
                    SourceCheck::EmbeddedPayload,
                    format!("Base64-encoded {name} found in file content"),
                );
            }
        }

        for (name, pattern) in DANGEROUS_TEXT_PATTERNS {
            if contains_bytes_ci(&decoded, pattern) {
                result.push_blocking(
                    SourceCheck::EmbeddedPayload,
                    format!("Base64-encoded content contains {name}"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use std::io::Write;

    fn temp_file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content).expect("write temp file");
        file
    }

    fn padded_header() -> Vec<u8> {
        let mut data = b"%PDF-1.4 ".to_vec();
        data.resize(HEADER_SKIP + 20, b' ');
        data
    }

    #[test]
    fn test_clean_file_passes() {
        let file = temp_file_with(b"%PDF-1.4 nothing hidden here at all");
        assert!(scan_for_embedded_files(file.path()).is_safe());
    }

    #[test]
    fn test_embedded_exe_signature_blocks() {
        let mut data = padded_header();
        data.extend_from_slice(b"MZ\x90\x00\x03\x00");
        let file = temp_file_with(&data);
        let result = scan_for_embedded_files(file.path());
        assert!(!result.is_safe());
        assert!(result
            .blocking_messages()
            .iter()
            .any(|m| m.contains("windows executable")));
    }

    #[test]
    fn test_magic_within_header_skip_is_ignored() {
        // An ELF file scanned as itself: its own magic sits at offset 0,
        // inside the skipped header region.
        let mut data = b"\x7fELF\x02\x01\x01".to_vec();
        data.resize(80, 0);
        let file = temp_file_with(&data);
        assert!(scan_for_embedded_files(file.path()).is_safe());
    }

    #[test]
    fn test_base64_executable_blocks() {
        let engine = base64::engine::general_purpose::STANDARD;
        let mut payload = b"MZ\x90\x00".to_vec();
        payload.resize(60, 0);
        let encoded = engine.encode(&payload);
        let file = temp_file_with(format!("some document body {encoded} trailer").as_bytes());
        let result = scan_for_embedded_files(file.path());
        assert!(!result.is_safe());
    }

    #[test]
    fn test_base64_script_content_blocks() {
        let engine = base64::engine::general_purpose::STANDARD;
        let encoded = engine.encode(b"<script>document.location='http://evil.example';</script>");
        assert!(encoded.len() >= 50);
        let file = temp_file_with(encoded.as_bytes());
        let result = scan_for_embedded_files(file.path());
        assert!(!result.is_safe());
    }

    #[test]
    fn test_benign_base64_passes() {
        let engine = base64::engine::general_purpose::STANDARD;
        let encoded = engine.encode("just a long but harmless run of ordinary document text here");
        let file = temp_file_with(encoded.as_bytes());
        assert!(scan_for_embedded_files(file.path()).is_safe());
    }

    #[test]
    fn test_candidate_limit_is_respected() {
        // Ten distinct base64 runs; only the first five get decoded. Put
        // the hostile one last so the limit is observable.
        let engine = base64::engine::general_purpose::STANDARD;
        let benign = engine.encode([7u8; 45]);
        let hostile = engine.encode(b"<script>alert(1)</script> plus padding to reach length");
        let mut content = String::new();
        for _ in 0..MAX_BASE64_CANDIDATES {
            content.push_str(&benign);
            content.push(' ');
        }
        content.push_str(&hostile);
        let file = temp_file_with(content.as_bytes());
        assert!(scan_for_embedded_files(file.path()).is_safe());
    }

    #[test]
    fn test_missing_file_warns_instead_of_failing() {
        let result = scan_for_embedded_files(Path::new("/nonexistent/upload.bin"));
        assert!(result.is_safe());
        assert_eq!(result.issues().len(), 1);
    }
}
