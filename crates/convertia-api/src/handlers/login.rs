//! Login endpoint with progressive lockout.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use convertia_core::{validate_user_input, AppError, InputKind};
use convertia_infra::LockoutStatus;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::ip_extraction::extract_client_ip;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub username: String,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpAppError> {
    let client_ip = extract_client_ip(&headers, None, state.config.trusted_proxy_count);

    let report = validate_user_input(&request.username, InputKind::Username);
    if !report.is_valid {
        return Err(AppError::InvalidInput(report.errors.join("; ")).into());
    }

    if state.login_tracker.is_ip_suspicious(&client_ip).await {
        warn!(client_ip, "login attempt from suspicious IP");
    }

    // A locked account rejects before the password is even looked at, so
    // lockouts cannot be used as a password oracle. The attempt is still
    // recorded as a failure so per-IP tracking keeps counting.
    let locked = state
        .login_tracker
        .lockout_status(&request.username)
        .await
        .is_locked();

    let success = !locked
        && state
            .credentials
            .verify(&request.username, &request.password);

    let status = state
        .login_tracker
        .record_attempt(&request.username, &client_ip, success)
        .await;

    if let LockoutStatus::Locked { remaining_secs } = status {
        return Err(AppError::AccountLocked {
            remaining_secs,
            reason: "too many failed login attempts".to_string(),
        }
        .into());
    }

    if success {
        Ok(Json(LoginResponse {
            status: "ok",
            username: request.username,
        }))
    } else {
        Err(AppError::Unauthorized("Invalid credentials".to_string()).into())
    }
}
