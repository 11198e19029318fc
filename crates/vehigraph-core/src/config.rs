//! Connection settings for the graph query client.
//!
//! Settings are loaded once at startup from (in priority order):
//! 1. Environment variables (`NEO4J_` prefix, e.g. `NEO4J_USER`, `NEO4J_URL`)
//! 2. Config file (`vehigraph.toml` by default)
//! 3. Defaults

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::VehigraphError;
use crate::types::{Credentials, DEFAULT_RESULT_LIMIT};

/// Top-level settings for both transports.
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Neo4j username.
    #[serde(default = "default_user")]
    pub user: String,

    /// Neo4j password.
    #[serde(default = "default_password")]
    pub password: String,

    /// Bolt endpoint. `NEO4J_URL` is used when `NEO4J_BOLT_URI` is unset.
    #[serde(default = "default_bolt_uri")]
    pub bolt_uri: String,

    /// Base URL of the HTTP API.
    #[serde(default = "default_http_url")]
    pub http_url: String,

    /// Database name used by both transports.
    #[serde(default = "default_database")]
    pub database: String,

    /// Result limit applied when a caller does not give one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Per-attempt timeout in seconds. Unset leaves the transport's own default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Set to false to skip Bolt and go straight to HTTP.
    #[serde(default = "default_true")]
    pub bolt_enabled: bool,

    /// Rows fetched per Bolt round trip.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_bolt_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_http_url() -> String {
    "http://localhost:7474".to_string()
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_limit() -> u32 {
    DEFAULT_RESULT_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_fetch_size() -> usize {
    256
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: default_user(),
            password: default_password(),
            bolt_uri: default_bolt_uri(),
            http_url: default_http_url(),
            database: default_database(),
            default_limit: default_limit(),
            timeout_secs: None,
            bolt_enabled: default_true(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("bolt_uri", &self.bolt_uri)
            .field("http_url", &self.http_url)
            .field("database", &self.database)
            .field("default_limit", &self.default_limit)
            .field("timeout_secs", &self.timeout_secs)
            .field("bolt_enabled", &self.bolt_enabled)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

impl Settings {
    /// Environment variable prefix, shared with the stock Neo4j tooling.
    pub const ENV_PREFIX: &'static str = "NEO4J";

    /// Load settings from `<file_prefix>.toml` (optional) and the process environment.
    pub fn load(file_prefix: &str) -> Result<Self, VehigraphError> {
        Self::load_with_env(
            file_prefix,
            config::Environment::with_prefix(Self::ENV_PREFIX),
        )
    }

    /// Load settings with an explicit environment source.
    ///
    /// Values stay strings until deserialized, so credentials such as
    /// `00123` are never reinterpreted as numbers.
    pub fn load_with_env(
        file_prefix: &str,
        env: config::Environment,
    ) -> Result<Self, VehigraphError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(env)
            .build()?;

        let legacy_url = match cfg.get_string("bolt_uri") {
            Ok(_) => None,
            Err(_) => cfg.get_string("url").ok(),
        };

        let mut settings: Settings = cfg.try_deserialize()?;
        if let Some(url) = legacy_url {
            settings.bolt_uri = url;
        }
        settings.validate()?;
        tracing::debug!(settings = ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Reject settings no query could succeed with.
    pub fn validate(&self) -> Result<(), VehigraphError> {
        if self.default_limit == 0 {
            return Err(VehigraphError::InvalidSetting {
                key: "default_limit",
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.database.trim().is_empty() {
            return Err(VehigraphError::InvalidSetting {
                key: "database",
                reason: "must not be empty".to_string(),
            });
        }
        if !(self.http_url.starts_with("http://") || self.http_url.starts_with("https://")) {
            return Err(VehigraphError::InvalidSetting {
                key: "http_url",
                reason: format!("expected an http(s) URL, got {:?}", self.http_url),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(VehigraphError::InvalidSetting {
                key: "timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user, &self.password)
    }

    /// Full URL of the transactional-commit endpoint.
    pub fn commit_url(&self) -> String {
        format!(
            "{}/db/{}/tx/commit",
            self.http_url.trim_end_matches('/'),
            self.database
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
