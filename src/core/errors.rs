//! WH-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, WhError>;

/// Top-level error type for wheelhouse.
#[derive(Debug, Error)]
pub enum WhError {
    #[error("[WH-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[WH-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[WH-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[WH-2001] render failure for {path}: {details}")]
    Render { path: PathBuf, details: String },

    #[error("[WH-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[WH-3001] not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("[WH-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[WH-3003] worker pool failure: {details}")]
    Worker { details: String },
}

impl WhError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "WH-1001",
            Self::MissingConfig { .. } => "WH-1002",
            Self::ConfigParse { .. } => "WH-1003",
            Self::Render { .. } => "WH-2001",
            Self::Serialization { .. } => "WH-2101",
            Self::NotADirectory { .. } => "WH-3001",
            Self::Io { .. } => "WH-3002",
            Self::Worker { .. } => "WH-3003",
        }
    }

    /// Whether the failure came from the user's input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::NotADirectory { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for WhError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for WhError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WhError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
