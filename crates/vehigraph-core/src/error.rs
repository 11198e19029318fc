use thiserror::Error;

/// Top-level error type for configuration and shared types.
#[derive(Error, Debug)]
pub enum VehigraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("Unknown relationship keyword: {0}")]
    UnknownKeyword(String),
}
