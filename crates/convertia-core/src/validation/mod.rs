//! Validation modules
//!
//! Validation classifies and never mutates; sanitization always returns a
//! usable value. Callers pick reject-on-invalid or sanitize-and-proceed
//! per field (a password must be rejected, a search query can be coerced).

pub mod filename;
pub mod input;
pub mod sanitize;

pub use filename::{is_filename_safe, sanitize_filename, SanitizedFilename};
pub use input::{validate_user_input, InputKind, InputReport};
pub use sanitize::{
    remove_dangerous_attributes, remove_script_tags, sanitize_user_input, SanitizeKind,
};
