//! Router construction and middleware ordering.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use convertia_infra::{request_id_middleware, security_headers_middleware};

use crate::handlers::{convert, health, login};
use crate::state::AppState;

/// Hard ceiling on request bodies, above any per-endpoint policy. Policy
/// limits reject with a clean 413 inside the guard; this layer only stops
/// grossly oversized bodies from being buffered at all.
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Build the application router with the full middleware stack.
pub fn build_router(state: AppState) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state)?;

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/auth/login", post(login::login))
        .route("/api/v1/convert/document", post(convert::convert_document))
        .route("/api/v1/convert/image", post(convert::convert_image))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(state);

    Ok(router)
}

fn setup_cors(state: &AppState) -> Result<CorsLayer, anyhow::Error> {
    let origins = &state.config.cors_origins;
    let cors = if origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let parsed: Result<Vec<HeaderValue>, _> = origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(parsed.map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
