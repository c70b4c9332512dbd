//! Ordered pre-admission checks.
//!
//! Each check is an explicit object implementing [`UploadCheck`]; the
//! guard runs them in registration order and stops at the first failure.
//! A new policy rule is a new struct here, not an edit to a monolithic
//! function.

use async_trait::async_trait;
use convertia_core::{is_filename_safe, AppError};
use convertia_infra::HttpRateLimiter;

use super::UploadPolicy;

/// Everything a pre-check may look at. Checks never see the file bytes;
/// anything that needs them belongs in the scan stage.
pub struct UploadContext<'a> {
    pub client_ip: &'a str,
    pub filename: &'a str,
    pub size_bytes: usize,
    pub policy: &'a UploadPolicy,
    pub rate_limiter: &'a HttpRateLimiter,
}

#[async_trait]
pub trait UploadCheck: Send + Sync {
    fn name(&self) -> &'static str;
    async fn check(&self, ctx: &UploadContext<'_>) -> Result<(), AppError>;
}

/// Extension of a claimed filename, lowercased. `None` for dotless names
/// and bare dotfiles like `.bashrc`.
pub(crate) fn claimed_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Per-IP sliding-window rate limit. First in line so abusive sources pay
/// nothing beyond a map lookup.
pub struct RateLimitCheck;

#[async_trait]
impl UploadCheck for RateLimitCheck {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn check(&self, ctx: &UploadContext<'_>) -> Result<(), AppError> {
        ctx.rate_limiter
            .check_rate_limit(&format!("ip:{}", ctx.client_ip))
            .await
            .map(|_remaining| ())
            .map_err(|retry_after| AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            })
    }
}

/// Claimed extension must be present and on the endpoint's allow-list.
pub struct ExtensionCheck;

#[async_trait]
impl UploadCheck for ExtensionCheck {
    fn name(&self) -> &'static str {
        "extension_allowlist"
    }

    async fn check(&self, ctx: &UploadContext<'_>) -> Result<(), AppError> {
        let allowed = &ctx.policy.allowed_extensions;
        match claimed_extension(ctx.filename) {
            Some(extension) if allowed.contains(&extension) => Ok(()),
            Some(extension) => Err(AppError::InvalidFileType(format!(
                "Extension '{}' is not accepted here. Allowed: {}",
                extension,
                allowed.join(", ")
            ))),
            None => Err(AppError::InvalidFileType(format!(
                "Filename has no extension. Allowed: {}",
                allowed.join(", ")
            ))),
        }
    }
}

/// Strict filename pre-check. Unlike sanitization, this rejects rather
/// than repairs: a traversal attempt in the claimed name is a signal
/// about the client, not a formatting problem.
pub struct FilenameCheck;

#[async_trait]
impl UploadCheck for FilenameCheck {
    fn name(&self) -> &'static str {
        "filename_precheck"
    }

    async fn check(&self, ctx: &UploadContext<'_>) -> Result<(), AppError> {
        if is_filename_safe(ctx.filename) {
            Ok(())
        } else {
            Err(AppError::UnsafeFilename(ctx.filename.to_string()))
        }
    }
}

/// Byte-size ceiling from the endpoint policy.
pub struct SizeCheck;

#[async_trait]
impl UploadCheck for SizeCheck {
    fn name(&self) -> &'static str {
        "size_limit"
    }

    async fn check(&self, ctx: &UploadContext<'_>) -> Result<(), AppError> {
        if ctx.size_bytes > ctx.policy.max_size_bytes() {
            return Err(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                ctx.policy.max_size_mb
            )));
        }
        Ok(())
    }
}
