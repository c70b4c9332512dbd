//! Configuration module
//!
//! Env-var driven configuration for the Convertia boundary service. Upload
//! policy (allowed extensions, max size) is per-endpoint and passed in by
//! the route registration, not configured here.

use std::env;

// Common constants
const SERVER_PORT: u16 = 3000;
const HTTP_RATE_LIMIT_PER_MINUTE: u32 = 100;
const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 5;
const LOCKOUT_BASE_SECS: u64 = 300;
const LOCKOUT_CAP_SECS: u64 = 3600;
const TRUSTED_PROXY_COUNT: usize = 1;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_rate_limit_per_minute: u32,
    pub trusted_proxy_count: usize,
    /// Directory for quarantine/temp files during validation. Defaults to
    /// the system temp dir when unset.
    pub upload_temp_dir: Option<String>,
    // Login lockout tuning
    pub max_failed_login_attempts: u32,
    pub lockout_base_secs: u64,
    pub lockout_cap_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env_parse("SERVER_PORT", SERVER_PORT),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
            http_rate_limit_per_minute: env_parse(
                "HTTP_RATE_LIMIT_PER_MINUTE",
                HTTP_RATE_LIMIT_PER_MINUTE,
            ),
            trusted_proxy_count: env_parse("TRUSTED_PROXY_COUNT", TRUSTED_PROXY_COUNT),
            upload_temp_dir: env::var("UPLOAD_TEMP_DIR").ok(),
            max_failed_login_attempts: env_parse(
                "MAX_FAILED_LOGIN_ATTEMPTS",
                MAX_FAILED_LOGIN_ATTEMPTS,
            ),
            lockout_base_secs: env_parse("LOCKOUT_BASE_SECS", LOCKOUT_BASE_SECS),
            lockout_cap_secs: env_parse("LOCKOUT_CAP_SECS", LOCKOUT_CAP_SECS),
        }
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            http_rate_limit_per_minute: HTTP_RATE_LIMIT_PER_MINUTE,
            trusted_proxy_count: TRUSTED_PROXY_COUNT,
            upload_temp_dir: None,
            max_failed_login_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            lockout_base_secs: LOCKOUT_BASE_SECS,
            lockout_cap_secs: LOCKOUT_CAP_SECS,
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.max_failed_login_attempts, 5);
        assert_eq!(config.lockout_base_secs, 300);
        assert_eq!(config.lockout_cap_secs, 3600);
        assert!(!config.is_production());
    }

    #[test]
    fn test_is_production() {
        let mut config = Config::default();
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "staging".to_string();
        assert!(!config.is_production());
    }
}
