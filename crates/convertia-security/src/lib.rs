//! Convertia Security Library
//!
//! The untrusted-file scanning pipeline: everything that inspects upload
//! bytes before a converter is allowed to touch them.
//!
//! - Byte-signature and dangerous-pattern scanning ([`patterns`])
//! - Per-format-family structural validation ([`content`])
//! - MIME/extension consistency checking ([`mime`])
//! - Embedded-payload detection ([`embedded`])
//!
//! Every scanner returns a [`convertia_core::ValidationResult`]; none of
//! them raise into the caller. Blocking structural checks fail closed: if
//! they cannot positively confirm safety, the file is rejected.

pub mod content;
pub mod embedded;
pub mod family;
pub mod mime;
pub mod patterns;

pub use content::validate_content;
pub use embedded::{scan_for_embedded_files, MAX_BASE64_CANDIDATES};
pub use family::FormatFamily;
pub use mime::{detect_mime_type, validate_mime_type};
