//! Demo conversion endpoints.
//!
//! Each endpoint runs the full upload guard and then reports what it
//! admitted. The actual converters plug in behind these handlers and are
//! not part of the security boundary.

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::{Extension, Json};
use convertia_infra::RequestId;
use serde::Serialize;

use crate::error::HttpAppError;
use crate::guard::{AdmittedUpload, UploadGuard, UploadPolicy};
use crate::multipart::extract_multipart_file;
use crate::state::AppState;
use crate::utils::ip_extraction::extract_client_ip;

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub status: &'static str,
    pub filename: String,
    pub size_bytes: usize,
    pub sha256: String,
    pub warnings: Vec<String>,
}

impl From<AdmittedUpload> for UploadAccepted {
    fn from(admitted: AdmittedUpload) -> Self {
        Self {
            status: "accepted",
            filename: admitted.stored_name.as_str().to_string(),
            size_bytes: admitted.size_bytes,
            sha256: admitted.sha256,
            warnings: admitted.warnings,
        }
    }
}

/// Accepts PDF documents for conversion.
pub async fn convert_document(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadAccepted>, HttpAppError> {
    let guard = UploadGuard::new(UploadPolicy::new(&["pdf", "docx", "xlsx", "odt"], 25, true));
    handle_upload(&state, &guard, &request_id, &headers, multipart).await
}

/// Accepts raster images for conversion.
pub async fn convert_image(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadAccepted>, HttpAppError> {
    let guard = UploadGuard::new(UploadPolicy::new(&["jpg", "jpeg", "png", "gif"], 10, true));
    handle_upload(&state, &guard, &request_id, &headers, multipart).await
}

async fn handle_upload(
    state: &AppState,
    guard: &UploadGuard,
    request_id: &RequestId,
    headers: &HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadAccepted>, HttpAppError> {
    let client_ip = extract_client_ip(headers, None, state.config.trusted_proxy_count);
    let (data, filename, _content_type) = extract_multipart_file(multipart).await?;

    let admitted = guard
        .admit(state, request_id.as_str(), &client_ip, &filename, &data)
        .await?;

    // A real converter would consume admitted.temp_file here; the demo
    // endpoint just acknowledges and lets the quarantine file drop.
    Ok(Json(UploadAccepted::from(admitted)))
}
