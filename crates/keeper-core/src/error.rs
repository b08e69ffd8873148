//! Error types for keeper-core

use std::path::PathBuf;

use crate::resource::ResourceKind;

/// Result type for keeper-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in keeper-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// No configuration file in any searched location
    #[error("No configuration file found (searched: {})", format_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    /// Environment name not present in the configuration
    #[error("Environment '{name}' not found in configuration. Available environments: {}", .available.join(", "))]
    UnknownEnvironment { name: String, available: Vec<String> },

    /// Cluster unreachable, TLS failure, or credentials rejected
    #[error("Connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    /// Cluster rejected a request
    #[error("API error ({status}): {reason}")]
    Api { status: u16, reason: String },

    /// Remote resource does not exist
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    /// Stored or received content has the wrong shape
    #[error("Invalid resource content: {message}")]
    Codec { message: String },

    /// Glob pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Command deadline passed or the user interrupted the run
    #[error("Interrupted before the item was processed")]
    Interrupted,

    /// Filesystem error from keeper-fs
    #[error(transparent)]
    Fs(#[from] keeper_fs::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// True for remote or local "does not exist" errors.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Fs(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Fatal errors abort the whole command instead of failing one item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::ConfigNotFound { .. }
                | Self::UnknownEnvironment { .. }
                | Self::Connection { .. }
        )
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
