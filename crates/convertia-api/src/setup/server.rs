//! Server startup and background maintenance.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use convertia_core::Config;

use crate::state::AppState;

/// Interval for sweeping fully expired rate-limit buckets.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Bind and serve until shutdown, with the limiter cleanup task running
/// alongside.
pub async fn start_server(config: &Config, state: AppState, router: Router) -> Result<()> {
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            rate_limiter.cleanup_expired_buckets().await;
        }
    });

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, environment = %config.environment, "Server listening");

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
