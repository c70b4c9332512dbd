//! Format-family dispatch
//!
//! Scanning rules differ sharply by format family: a DOCX is a ZIP of XML
//! and will coincidentally contain byte runs that look like script tags, so
//! the generic pattern sweep must never run against formats with known
//! internal structure. The family set is a closed enum so adding one is a
//! compile-checked change, not a string-keyed lookup.

/// The format families the scanner knows how to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFamily {
    /// PDF documents
    Pdf,
    /// Office Open XML and OpenDocument formats
    Office,
    /// JPEG/PNG/GIF raster images
    RasterImage,
    /// Anything else: gets the generic pattern sweep
    Other,
}

impl FormatFamily {
    /// Classify by claimed (lowercased) extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "pdf" => FormatFamily::Pdf,
            "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "odt" | "ods" | "odp" => {
                FormatFamily::Office
            }
            "jpg" | "jpeg" | "png" | "gif" => FormatFamily::RasterImage,
            _ => FormatFamily::Other,
        }
    }
}
