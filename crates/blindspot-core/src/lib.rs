//! Shared vocabulary and configuration for the blindspot workspace.
//!
//! This crate owns the types every other crate speaks: bias labels and
//! verdicts, the [`Article`] value object handed from the database layer to
//! the analyzer, the media-outlet registry loaded from YAML, and the
//! environment-driven [`AppConfig`].

use thiserror::Error;

pub mod app_config;
pub mod article;
pub mod bias;
pub mod config;
pub mod outlets;

pub use app_config::{AppConfig, Environment};
pub use article::Article;
pub use bias::{BiasLabel, Verdict};
pub use config::{load_app_config, load_app_config_from_env};
pub use outlets::{load_outlets, OutletConfig, OutletRegistry, OutletsFile};

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read outlets file at {path}: {source}")]
    OutletsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse outlets file: {0}")]
    OutletsFileParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
