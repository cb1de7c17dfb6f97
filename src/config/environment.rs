// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a typed ServerConfig with validation and a secret-free summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, limits, session};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational output
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Public deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe credential store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-SQLite connection strings
    pub fn parse_url(s: &str) -> Result<Self> {
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            bail!("Only SQLite databases are supported, got: {s}");
        }

        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
        if path_str == ":memory:" {
            return Ok(Self::Memory);
        }
        if path_str.is_empty() {
            bail!("DATABASE_URL does not name a database file");
        }

        Ok(Self::SQLite {
            path: PathBuf::from(path_str),
        })
    }

    /// Convert to an `sqlx` connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/nutrifind.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Credential store settings
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Vision model settings
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// API base URL without trailing slash
    pub base_url: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: defaults::GEMINI_MODEL.to_owned(),
            base_url: defaults::GEMINI_API_BASE.to_owned(),
        }
    }
}

/// Session store settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inactivity expiry in seconds
    pub ttl_secs: u64,
    /// Maximum number of live sessions
    pub max_entries: usize,
    /// Add `Secure` to the session cookie
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: session::DEFAULT_TTL_SECS,
            max_entries: session::DEFAULT_MAX_ENTRIES,
            secure_cookie: false,
        }
    }
}

/// Optional persistence switched on per deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Extract totals from each analysis and allow storing them
    pub nutrition_tracking: bool,
    /// Persist uploaded images together with the model response
    pub store_analysis_images: bool,
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Credential store
    pub database: DatabaseConfig,
    /// Vision model client
    pub gemini: GeminiConfig,
    /// Session store
    pub session: SessionConfig,
    /// Optional persistence
    pub features: FeatureFlags,
    /// Upper bound on request bodies for image uploads
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            log_level: LogLevel::default(),
            environment: Environment::default(),
            database: DatabaseConfig::default(),
            gemini: GeminiConfig::default(),
            session: SessionConfig::default(),
            features: FeatureFlags::default(),
            max_upload_bytes: limits::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed, the API key is missing,
    /// or the resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let api_key = env::var("GOOGLE_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .context("GOOGLE_API_KEY (or GEMINI_API_KEY) must be set")?;

        let config = Self {
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            host: env_var_or("HOST", defaults::HOST),
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            environment,
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL))
                    .context("Invalid DATABASE_URL value")?,
            },
            gemini: GeminiConfig {
                api_key,
                model: env_var_or("GEMINI_MODEL", defaults::GEMINI_MODEL),
                base_url: env_var_or("GEMINI_API_BASE", defaults::GEMINI_API_BASE)
                    .trim_end_matches('/')
                    .to_owned(),
            },
            session: SessionConfig {
                ttl_secs: parse_env("SESSION_TTL_SECS", session::DEFAULT_TTL_SECS)?,
                max_entries: parse_env("SESSION_MAX_ENTRIES", session::DEFAULT_MAX_ENTRIES)?,
                secure_cookie: parse_flag("SESSION_SECURE_COOKIE", environment.is_production())?,
            },
            features: FeatureFlags {
                nutrition_tracking: parse_flag("NUTRITION_TRACKING_ENABLED", false)?,
                store_analysis_images: parse_flag("STORE_ANALYSIS_IMAGES", false)?,
            },
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", limits::DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            bail!("HTTP_PORT must be non-zero");
        }
        if self.gemini.api_key.trim().is_empty() {
            bail!("GOOGLE_API_KEY must not be empty");
        }
        if self.gemini.model.trim().is_empty() {
            bail!("GEMINI_MODEL must not be empty");
        }
        if self.session.ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be greater than zero");
        }
        if self.session.ttl_secs > session::MAX_TTL_SECS {
            bail!(
                "SESSION_TTL_SECS must be at most {} (one year)",
                session::MAX_TTL_SECS
            );
        }
        if self.session.max_entries == 0 {
            bail!("SESSION_MAX_ENTRIES must be greater than zero");
        }
        if self.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }
        if self.environment.is_production() && !self.session.secure_cookie {
            warn!("Running in production without SESSION_SECURE_COOKIE");
        }
        if self.environment.is_production() && self.database.url.is_memory() {
            warn!("Running in production with an in-memory database; accounts will not persist");
        }

        Ok(())
    }

    /// One-line summary safe to log (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "NutriFind configuration: listen={}:{} environment={} log_level={} database={} \
             model={} session_ttl={}s max_sessions={} secure_cookie={} nutrition_tracking={} \
             store_images={} max_upload_bytes={}",
            self.host,
            self.http_port,
            self.environment,
            self.log_level,
            if self.database.url.is_memory() {
                "sqlite (memory)"
            } else {
                "sqlite (file)"
            },
            self.gemini.model,
            self.session.ttl_secs,
            self.session.max_entries,
            self.session.secure_cookie,
            self.features.nutrition_tracking,
            self.features.store_analysis_images,
            self.max_upload_bytes,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {value}")),
        Err(_) => Ok(default),
    }
}

/// Accepts true/false, 1/0, yes/no, on/off
fn parse_flag(key: &str, default: bool) -> Result<bool> {
    let Ok(value) = env::var(key) else {
        return Ok(default);
    };
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => bail!("Invalid {key} value: {other}"),
    }
}
