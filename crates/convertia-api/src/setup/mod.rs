//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs so the
//! integration tests can build the exact router the binary serves.

pub mod routes;
pub mod server;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use convertia_core::Config;

use crate::auth::{CredentialVerifier, DenyAll, StaticCredentials};
use crate::state::AppState;

/// Build state and router from a validated configuration.
pub fn initialize_app(config: Config) -> Result<(AppState, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    let credentials: Arc<dyn CredentialVerifier> = match StaticCredentials::from_env() {
        Some(creds) => Arc::new(creds),
        None => {
            tracing::info!("No credential source configured, login endpoint denies all attempts");
            Arc::new(DenyAll)
        }
    };

    let state = AppState::new(config, credentials);
    let router = routes::build_router(state.clone())?;

    tracing::info!("Configuration loaded and validated successfully");
    Ok((state, router))
}
