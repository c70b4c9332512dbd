//! MIME consistency checking.
//!
//! Magic-number detection over the first bytes of a file, compared against
//! the type the extension claims. Detection is heuristic (legacy Office
//! files and OOXML both open with container magic, text formats have none),
//! so a mismatch is only ever advisory. The content scanners decide
//! rejection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use convertia_core::{SourceCheck, ValidationResult};
use tracing::debug;

/// How many bytes of the file head the sniffer reads.
const SNIFF_LEN: usize = 16;

/// Magic-number table, ordered longest prefix first where prefixes overlap.
const MAGIC_TYPES: &[(&[u8], &str)] = &[
    (b"%PDF", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"PK\x03\x04", "application/zip"),
    (b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "application/x-ole-storage"),
    (b"MZ", "application/x-msdownload"),
    (b"\x7fELF", "application/x-executable"),
];

/// Expected sniffed type per extension, for the types the sniffer can
/// actually detect. Extensions absent here are never checked.
const EXPECTED_TYPES: &[(&str, &[&str])] = &[
    ("pdf", &["application/pdf"]),
    ("png", &["image/png"]),
    ("jpg", &["image/jpeg"]),
    ("jpeg", &["image/jpeg"]),
    ("gif", &["image/gif"]),
    // OOXML is ZIP; legacy Office is OLE compound storage.
    ("docx", &["application/zip"]),
    ("xlsx", &["application/zip"]),
    ("pptx", &["application/zip"]),
    ("odt", &["application/zip"]),
    ("ods", &["application/zip"]),
    ("odp", &["application/zip"]),
    ("doc", &["application/x-ole-storage", "application/zip"]),
    ("xls", &["application/x-ole-storage", "application/zip"]),
    ("ppt", &["application/x-ole-storage", "application/zip"]),
];

/// Sniff a MIME type from leading magic bytes. `None` when no known
/// signature matches, which is normal for plain-text formats.
pub fn detect_mime_type(head: &[u8]) -> Option<&'static str> {
    MAGIC_TYPES
        .iter()
        .find(|(magic, _)| head.starts_with(magic))
        .map(|(_, mime)| *mime)
}

/// Compare the sniffed type of the file at `path` against what
/// `claimed_extension` implies.
///
/// Only ever produces warnings. An unreadable file is reported as a
/// warning too rather than failing the pipeline, since the content scan
/// runs on the in-memory bytes independently of this check.
pub fn validate_mime_type(path: &Path, claimed_extension: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    let mut head = [0u8; SNIFF_LEN];
    let read = match File::open(path).and_then(|mut f| f.read(&mut head)) {
        Ok(n) => n,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read file head");
            result.push_warning(
                SourceCheck::MimeConsistency,
                "Could not read file for MIME detection",
            );
            return result;
        }
    };

    let detected = detect_mime_type(&head[..read]);
    let extension = claimed_extension.to_lowercase();
    let expected = EXPECTED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, types)| *types);

    match (detected, expected) {
        (Some(found), Some(allowed)) if !allowed.contains(&found) => {
            result.push_warning(
                SourceCheck::MimeConsistency,
                format!("File content is {found} but extension claims .{extension}"),
            );
        }
        (None, Some(_)) => {
            result.push_warning(
                SourceCheck::MimeConsistency,
                format!("File has no recognizable signature for .{extension}"),
            );
        }
        // Either the signature agrees with the extension, or the
        // extension's format has no reliable magic to check against.
        _ => {}
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content).expect("write temp file");
        file
    }

    #[test]
    fn test_detects_common_signatures() {
        assert_eq!(detect_mime_type(b"%PDF-1.7"), Some("application/pdf"));
        assert_eq!(detect_mime_type(b"\x89PNG\r\n\x1a\n...."), Some("image/png"));
        assert_eq!(detect_mime_type(b"PK\x03\x04...."), Some("application/zip"));
        assert_eq!(detect_mime_type(b"plain text"), None);
    }

    #[test]
    fn test_matching_content_produces_no_issues() {
        let file = temp_file_with(b"%PDF-1.4 content");
        let result = validate_mime_type(file.path(), "pdf");
        assert!(result.issues().is_empty());
    }

    #[test]
    fn test_mismatch_warns_but_never_blocks() {
        let file = temp_file_with(b"MZ\x90\x00 this is an exe");
        let result = validate_mime_type(file.path(), "pdf");
        assert!(result.is_safe());
        assert_eq!(result.issues().len(), 1);
    }

    #[test]
    fn test_unknown_extension_is_not_checked() {
        let file = temp_file_with(b"arbitrary bytes");
        let result = validate_mime_type(file.path(), "txt");
        assert!(result.issues().is_empty());
    }

    #[test]
    fn test_missing_signature_warns() {
        let file = temp_file_with(b"not actually a png");
        let result = validate_mime_type(file.path(), "png");
        assert!(result.is_safe());
        assert_eq!(result.issues().len(), 1);
    }

    #[test]
    fn test_missing_file_warns_instead_of_failing() {
        let result = validate_mime_type(Path::new("/nonexistent/upload.pdf"), "pdf");
        assert!(result.is_safe());
        assert_eq!(result.issues().len(), 1);
    }
}
