//! Format-aware content scanning.
//!
//! Each format family gets its own check routine so that findings stay
//! meaningful: a `/JavaScript` name object matters in a PDF, a `vbaProject`
//! entry matters in an Office container, and neither should fire on the
//! other. Unknown formats fall back to a generic hostile-pattern sweep.

use convertia_core::{SourceCheck, ValidationResult};
use tracing::debug;

use crate::family::FormatFamily;
use crate::patterns::{
    contains_bytes, contains_bytes_ci, DANGEROUS_TEXT_PATTERNS, OFFICE_EMBEDDED_EXEC_MARKERS,
    OFFICE_EXTERNAL_CONN_MARKERS, OFFICE_MACRO_MARKERS,
};

/// PDF name objects that trigger script or file execution on open.
const PDF_ACTIVE_CONTENT: &[(&str, &[u8])] = &[
    ("JavaScript action", b"/JavaScript"),
    ("JavaScript action", b"/JS"),
    ("launch action", b"/Launch"),
    ("embedded file", b"/EmbeddedFile"),
    ("open action", b"/OpenAction"),
    ("additional action", b"/AA"),
];

/// Scan file content according to its claimed extension.
///
/// Findings are accumulated rather than short-circuited so the audit log
/// records everything wrong with a rejected file at once.
pub fn validate_content(data: &[u8], extension: &str) -> ValidationResult {
    let family = FormatFamily::from_extension(extension);
    debug!(extension, family = ?family, size = data.len(), "scanning file content");

    match family {
        FormatFamily::Pdf => check_pdf(data),
        FormatFamily::Office => check_office(data),
        FormatFamily::RasterImage => check_raster_image(data),
        FormatFamily::Other => check_generic(data),
    }
}

fn check_pdf(data: &[u8]) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !data.starts_with(b"%PDF") {
        result.push_blocking(SourceCheck::StructuralValidation, "Invalid PDF header");
    }

    for (name, marker) in PDF_ACTIVE_CONTENT {
        if contains_bytes(data, marker) {
            result.push_blocking(
                SourceCheck::SignatureScan,
                format!("PDF contains active content: {name}"),
            );
        }
    }

    result
}

fn check_office(data: &[u8]) -> ValidationResult {
    let mut result = ValidationResult::new();

    if OFFICE_MACRO_MARKERS.iter().any(|m| contains_bytes(data, m)) {
        result.push_blocking(SourceCheck::SignatureScan, "Office document contains VBA macros");
    }

    if OFFICE_EMBEDDED_EXEC_MARKERS
        .iter()
        .any(|m| contains_bytes(data, m))
    {
        result.push_blocking(
            SourceCheck::SignatureScan,
            "Office document declares an embedded executable object",
        );
    }

    // A single indicator is common in benign workbooks. Two or more
    // distinct ones mark a data connection that refreshes on open.
    let distinct_indicators = OFFICE_EXTERNAL_CONN_MARKERS
        .iter()
        .filter(|m| contains_bytes(data, m))
        .count();
    if distinct_indicators >= 2 {
        result.push_blocking(
            SourceCheck::SignatureScan,
            "Office document defines external data connections",
        );
    }

    result
}

fn check_raster_image(data: &[u8]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, marker) in [
        ("script tag", b"<script".as_slice()),
        ("javascript scheme", b"javascript:".as_slice()),
        ("php tag", b"<?php".as_slice()),
    ] {
        if contains_bytes_ci(data, marker) {
            result.push_blocking(
                SourceCheck::SignatureScan,
                format!("Image contains embedded {name}"),
            );
        }
    }

    result
}

fn check_generic(data: &[u8]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, marker) in DANGEROUS_TEXT_PATTERNS {
        if contains_bytes_ci(data, marker) {
            result.push_blocking(
                SourceCheck::SignatureScan,
                format!("File contains dangerous pattern: {name}"),
            );
        }
    }

    result
}
