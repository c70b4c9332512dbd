//! Configuration validation
//!
//! Validates critical configuration values at startup to catch
//! misconfigurations early, before the server binds.

use anyhow::Result;
use convertia_core::Config;

/// Validate critical configuration values, failing fast on settings that
/// would weaken the security boundary at runtime.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.is_production() && config.cors_origins.contains(&"*".to_string()) {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.http_rate_limit_per_minute == 0 {
        return Err(anyhow::anyhow!("HTTP rate limit cannot be 0"));
    }

    if config.max_failed_login_attempts == 0 {
        return Err(anyhow::anyhow!("Max failed login attempts cannot be 0"));
    }

    if config.lockout_base_secs == 0 {
        return Err(anyhow::anyhow!("Lockout base duration cannot be 0"));
    }

    if config.lockout_cap_secs < config.lockout_base_secs {
        return Err(anyhow::anyhow!(
            "Lockout cap ({} s) is below the base duration ({} s)",
            config.lockout_cap_secs,
            config.lockout_base_secs
        ));
    }

    if let Some(temp_dir) = &config.upload_temp_dir {
        if !std::path::Path::new(temp_dir).is_dir() {
            return Err(anyhow::anyhow!(
                "UPLOAD_TEMP_DIR '{}' does not exist or is not a directory",
                temp_dir
            ));
        }
    }

    if config.trusted_proxy_count > 10 {
        tracing::warn!(
            trusted_proxy_count = config.trusted_proxy_count,
            "TRUSTED_PROXY_COUNT is very high - ensure this matches your actual proxy setup"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_production_wildcard_cors_fails() {
        let config = Config {
            environment: "production".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_production_with_explicit_origins_passes() {
        let config = Config {
            environment: "production".to_string(),
            cors_origins: vec!["https://app.example.com".to_string()],
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_rate_limit_fails() {
        let config = Config {
            http_rate_limit_per_minute: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_lockout_cap_below_base_fails() {
        let config = Config {
            lockout_base_secs: 600,
            lockout_cap_secs: 300,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_temp_dir_fails() {
        let config = Config {
            upload_temp_dir: Some("/nonexistent/convertia-temp".to_string()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
