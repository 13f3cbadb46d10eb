//! Service configuration
//!
//! Values are layered: built-in defaults, then an optional `notes.toml` in the
//! working directory, then environment variables (`SESSION_SECRET`,
//! `SESSION_TTL_SECONDS`, ...). The session secret has no default; a missing
//! secret is a startup error.

use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: u64 = 60 * 60;
const DEFAULT_PASSWORD_MEMORY_KIB: u32 = 19 * 1024;
const DEFAULT_PASSWORD_ITERATIONS: u32 = 2;

/// HS256 keys shorter than this are rejected
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Longest accepted reset token lifetime (one day)
pub const MAX_RESET_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Notes service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Secret used to sign session tokens
    pub session_secret: String,
    /// Session lifetime in seconds
    pub session_ttl_seconds: u64,
    /// Mark the session cookie `Secure`
    pub session_cookie_secure: bool,
    /// Reset token lifetime in seconds
    pub reset_token_ttl_seconds: u64,
    /// Base URL used when building reset links
    pub public_base_url: String,
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    /// Argon2 memory cost in KiB
    pub password_memory_kib: u32,
    /// Argon2 iteration count
    pub password_iterations: u32,
}

impl Settings {
    /// Load settings from `notes.toml` (optional) and the environment
    pub fn load() -> Result<Self, SettingsError> {
        let raw = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("public_base_url", DEFAULT_PUBLIC_BASE_URL)?
            .set_default("session_ttl_seconds", DEFAULT_SESSION_TTL_SECONDS as i64)?
            .set_default("session_cookie_secure", false)?
            .set_default("reset_token_ttl_seconds", DEFAULT_RESET_TOKEN_TTL_SECONDS as i64)?
            .set_default("password_memory_kib", DEFAULT_PASSWORD_MEMORY_KIB as i64)?
            .set_default("password_iterations", DEFAULT_PASSWORD_ITERATIONS as i64)?
            .add_source(File::with_name("notes").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults everywhere except the signing secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            session_secret: secret.into(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            reset_token_ttl_seconds: DEFAULT_RESET_TOKEN_TTL_SECONDS,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            password_memory_kib: DEFAULT_PASSWORD_MEMORY_KIB,
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
        }
    }

    /// Check the secret length and that both lifetimes are within bounds
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.session_secret.len() < MIN_SECRET_BYTES {
            return Err(SettingsError::Invalid(format!(
                "SESSION_SECRET must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }
        check_ttl(
            "SESSION_TTL_SECONDS",
            self.session_ttl_seconds,
            MAX_SESSION_TTL_SECONDS,
        )?;
        check_ttl(
            "RESET_TOKEN_TTL_SECONDS",
            self.reset_token_ttl_seconds,
            MAX_RESET_TOKEN_TTL_SECONDS,
        )?;
        Ok(())
    }

    /// Session lifetime, capped at [`MAX_SESSION_TTL_SECONDS`]
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS) as i64)
    }

    /// Reset token lifetime, capped at [`MAX_RESET_TOKEN_TTL_SECONDS`]
    pub fn reset_token_ttl(&self) -> Duration {
        Duration::seconds(self.reset_token_ttl_seconds.min(MAX_RESET_TOKEN_TTL_SECONDS) as i64)
    }
}

fn check_ttl(name: &str, seconds: u64, max: u64) -> Result<(), SettingsError> {
    if seconds == 0 {
        return Err(SettingsError::Invalid(format!("{} must be positive", name)));
    }
    if seconds > max {
        return Err(SettingsError::Invalid(format!(
            "{} must be at most {} seconds",
            name, max
        )));
    }
    Ok(())
}
