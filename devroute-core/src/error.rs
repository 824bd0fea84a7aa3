//! Error types for the decision core
//!
//! None of these reach a caller of the public contract operations; they are
//! produced by internal steps and folded into documented defaults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Input the classifier refuses to evaluate
    #[error("Classification error: {0}")]
    Classification(String),

    /// An anchor handler is not present in the registry
    #[error("Anchor handler '{0}' is not registered")]
    MissingAnchor(String),

    #[error("No handlers are registered")]
    EmptyRegistry,

    /// A score came out as NaN or infinite
    #[error("Non-finite score for handler '{handler}'")]
    NonFiniteScore { handler: String },

    #[error("Unknown handler '{0}'")]
    UnknownHandler(String),

    /// Key-value store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Corrupt payload under key '{key}': {message}")]
    CorruptPayload { key: String, message: String },

    #[error("Unsupported schema version {found} for key '{key}' (max {supported})")]
    UnsupportedVersion { key: String, found: u32, supported: u32 },

    /// Outcome context lacks a field the extraction strategy needs
    #[error("Missing context field '{field}' for action '{action}'")]
    MissingContext { action: String, field: &'static str },

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
