//! Convertia Core Library
//!
//! This crate provides the core domain types shared across all Convertia
//! components: error taxonomy, configuration, the validation report model,
//! and the input/filename validators that guard every external field.

pub mod config;
pub mod error;
pub mod report;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use report::{Severity, SourceCheck, ValidationIssue, ValidationResult};
pub use validation::filename::{is_filename_safe, sanitize_filename, SanitizedFilename};
pub use validation::input::{validate_user_input, InputKind, InputReport};
pub use validation::sanitize::{
    remove_dangerous_attributes, remove_script_tags, sanitize_user_input, SanitizeKind,
};
