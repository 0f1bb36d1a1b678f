//! Application configuration loaded from environment variables.
//!
//! `security.jwt.*` settings map to `SECURITY_JWT_*` variables; server
//! settings use the `KBOOT_` prefix.

use std::env;

use crate::auth::claims::{DEFAULT_AUDIENCE, DEFAULT_ISSUER};
use crate::error::AppError;
use crate::errors::problem::PROBLEM_BASE_URL;
use crate::state::security_config::SecurityConfig;

pub const ENV_JWT_ISSUER: &str = "SECURITY_JWT_ISSUER";
pub const ENV_JWT_AUDIENCE: &str = "SECURITY_JWT_AUDIENCE";
pub const ENV_JWT_SECRET: &str = "SECURITY_JWT_SECRET";
pub const ENV_HOST: &str = "KBOOT_HOST";
pub const ENV_PORT: &str = "KBOOT_PORT";
pub const ENV_FAKETOKEN_ENABLED: &str = "KBOOT_FAKETOKEN_ENABLED";
pub const ENV_PROBLEM_BASE_URL: &str = "KBOOT_PROBLEM_BASE_URL";

#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Security configuration
    pub security: SecurityConfig,

    /// Mount the demo `/faketoken` endpoints.
    pub faketoken_enabled: bool,

    /// Base URI for problem `type` values.
    pub problem_base_url: String,
}

impl Config {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(ENV_HOST).unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::config(format!("{ENV_PORT} must be a valid port number, got '{raw}'"))
            })?,
            None => 8080,
        };

        let secret = lookup(ENV_JWT_SECRET)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::config(format!("{ENV_JWT_SECRET} must be set")))?;
        let issuer = lookup(ENV_JWT_ISSUER).unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        let audience = lookup(ENV_JWT_AUDIENCE).unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());
        let security = SecurityConfig::new(issuer, audience, &secret)
            .map_err(|e| AppError::config(e.to_string()))?;

        let faketoken_enabled = match lookup(ENV_FAKETOKEN_ENABLED) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::config(format!("{ENV_FAKETOKEN_ENABLED} must be true or false, got '{raw}'"))
            })?,
            None => true,
        };

        let problem_base_url =
            lookup(ENV_PROBLEM_BASE_URL).unwrap_or_else(|| PROBLEM_BASE_URL.to_string());

        Ok(Config {
            host,
            port,
            security,
            faketoken_enabled,
            problem_base_url,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
