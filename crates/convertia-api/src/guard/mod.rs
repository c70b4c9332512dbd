//! Upload guard
//!
//! The single boundary every file-accepting route goes through. Cheap
//! policy checks run first in a fixed order (rate limit, extension,
//! filename, size) and short-circuit at the first failure; only then are
//! the bytes persisted to a quarantine temp file and handed to the content
//! scanners. The temp file is owned by the returned [`AdmittedUpload`] on
//! success and dropped on every failure path, so rejected bytes never
//! outlive the request.

mod checks;

use std::io::Write;

use convertia_core::{sanitize_filename, AppError, SanitizedFilename, ValidationResult};
use convertia_security::{scan_for_embedded_files, validate_content, validate_mime_type};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::state::AppState;
use checks::{claimed_extension, ExtensionCheck, FilenameCheck, RateLimitCheck, SizeCheck};
pub use checks::{UploadCheck, UploadContext};

/// Per-endpoint upload policy, set at route registration.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_size_mb: usize,
    /// Run the embedded-payload scanner in addition to the format checks.
    pub scan_malware: bool,
}

impl UploadPolicy {
    pub fn new(allowed_extensions: &[&str], max_size_mb: usize, scan_malware: bool) -> Self {
        Self {
            allowed_extensions: allowed_extensions.iter().map(|e| e.to_lowercase()).collect(),
            max_size_mb,
            scan_malware,
        }
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_mb * 1024 * 1024
    }
}

/// An upload that passed every check. Dropping this drops the temp file.
#[derive(Debug)]
pub struct AdmittedUpload {
    pub temp_file: NamedTempFile,
    pub stored_name: SanitizedFilename,
    pub size_bytes: usize,
    /// SHA-256 of the admitted bytes, for the audit trail.
    pub sha256: String,
    /// Advisory findings that did not block admission.
    pub warnings: Vec<String>,
}

/// Ordered pre-checks plus the content-scan stage for one policy.
pub struct UploadGuard {
    policy: UploadPolicy,
    checks: Vec<Box<dyn UploadCheck>>,
}

impl UploadGuard {
    pub fn new(policy: UploadPolicy) -> Self {
        let checks: Vec<Box<dyn UploadCheck>> = vec![
            Box::new(RateLimitCheck),
            Box::new(ExtensionCheck),
            Box::new(FilenameCheck),
            Box::new(SizeCheck),
        ];
        Self { policy, checks }
    }

    /// Run the full admission pipeline for one upload. `request_id`
    /// correlates the audit entries with the rest of the request's logs.
    pub async fn admit(
        &self,
        state: &AppState,
        request_id: &str,
        client_ip: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<AdmittedUpload, AppError> {
        let ctx = UploadContext {
            client_ip,
            filename,
            size_bytes: data.len(),
            policy: &self.policy,
            rate_limiter: &state.rate_limiter,
        };

        for check in &self.checks {
            if let Err(err) = check.check(&ctx).await {
                debug!(
                    check = check.name(),
                    request_id,
                    client_ip,
                    filename,
                    "upload rejected by pre-check"
                );
                return Err(err);
            }
        }

        // Pre-checks guarantee a present, allow-listed extension.
        let extension = claimed_extension(filename).unwrap_or_default();
        let stored_name = sanitize_filename(filename);

        let mut temp_file = create_temp_file(state)?;
        temp_file.write_all(data)?;
        temp_file.flush()?;

        let mut result = validate_content(data, &extension);
        result.merge(validate_mime_type(temp_file.path(), &extension));
        if self.policy.scan_malware {
            result.merge(scan_for_embedded_files(temp_file.path()));
        }

        if !result.is_safe() {
            let blocking = result.blocking_messages().join("; ");
            warn!(
                request_id,
                client_ip,
                filename,
                issues = %issues_json(&result),
                "upload rejected by content scan"
            );
            // temp_file drops here; the quarantined bytes are gone before
            // the rejection leaves this function.
            return Err(AppError::SecurityViolation(blocking));
        }

        let warnings: Vec<String> = result
            .issues()
            .iter()
            .map(|issue| issue.message.clone())
            .collect();
        let sha256 = hex::encode(Sha256::digest(data));

        info!(
            request_id,
            client_ip,
            original_filename = filename,
            stored_name = stored_name.as_str(),
            size_bytes = data.len(),
            sha256 = %sha256,
            warning_count = warnings.len(),
            "upload admitted"
        );

        Ok(AdmittedUpload {
            temp_file,
            stored_name,
            size_bytes: data.len(),
            sha256,
            warnings,
        })
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }
}

fn create_temp_file(state: &AppState) -> Result<NamedTempFile, AppError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("convertia-quarantine-");
    let temp_file = match &state.config.upload_temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    Ok(temp_file)
}

fn issues_json(result: &ValidationResult) -> String {
    serde_json::to_string(result.issues()).unwrap_or_else(|_| "[]".to_string())
}
