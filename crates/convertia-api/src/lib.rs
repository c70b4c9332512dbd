//! Convertia API Library
//!
//! This crate provides the HTTP boundary of the conversion platform: the
//! upload guard, handlers, middleware wiring, and application setup.

// Module declarations
mod handlers;
mod multipart;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod guard;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use guard::{AdmittedUpload, UploadGuard, UploadPolicy};
pub use state::AppState;
