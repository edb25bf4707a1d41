use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// External services the pipelines delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    Vision,
    Text,
    Embedding,
    Index,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::Vision => "vision model",
            Collaborator::Text => "text model",
            Collaborator::Embedding => "embedding model",
            Collaborator::Index => "vector index",
        };
        f.write_str(name)
    }
}

/// Top-level error type for the Greenlens pipelines.
#[derive(Debug, Error)]
pub enum LensError {
    /// Missing or unusable request input. Never carries a partial result.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("{collaborator} failed: {message}")]
    CollaboratorFailure {
        collaborator: Collaborator,
        message: String,
    },

    #[error("catalog error: {0}")]
    CatalogError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LensError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InputInvalid(reason.into())
    }

    /// Wrap a collaborator error, keeping the full cause chain in the message.
    pub fn collaborator(collaborator: Collaborator, err: impl fmt::Display) -> Self {
        let message = format!("{err:#}");
        warn!(%collaborator, %message, "Collaborator call failed");
        Self::CollaboratorFailure { collaborator, message }
    }

    /// True when the caller sent bad input (maps to a 4xx in an HTTP layer).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InputInvalid(_))
    }
}

/// Result alias used across the pipeline crates.
pub type LensResult<T> = Result<T, LensError>;
