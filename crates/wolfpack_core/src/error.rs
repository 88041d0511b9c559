//! Error types for the pack engine.
//!
//! Collaborators report failures through [`EngineError`]. The behaviors never
//! propagate these: they log, count, and carry on with "no information" for
//! the current tick.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A host collaborator could not answer.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    /// A resource key the store does not understand.
    #[error("Unknown resource key: {0}")]
    UnknownResource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    #[must_use]
    pub fn collaborator<S: Into<String>>(collaborator: &'static str, message: S) -> Self {
        Self::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_resource<S: Into<String>>(key: S) -> Self {
        Self::UnknownResource(key.into())
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
