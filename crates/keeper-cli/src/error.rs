//! Error types for keeper-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from keeper-core
    #[error(transparent)]
    Core(#[from] keeper_core::Error),

    /// JSON output could not be rendered
    #[error("Cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML output could not be rendered
    #[error("Cannot render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Whether the error stops the kinds still waiting in a multi-kind run.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Core(e) => e.is_fatal(),
            Self::Json(_) | Self::Yaml(_) | Self::User { .. } => true,
        }
    }
}
