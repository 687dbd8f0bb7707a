//! Error types for the scoring framework

use thiserror::Error;

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while configuring or driving an evaluation.
///
/// Scoring itself never fails: malformed tool calls and missing ground truth
/// degrade to a zero score instead. These variants cover the surrounding
/// configuration and file layer.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to parse an input document
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Why a tool call's argument payload could not be decoded.
///
/// The extractor swallows these and substitutes an empty mapping; they are
/// surfaced through [`crate::extract::decode_arguments`] for callers and tests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentDecodeError {
    /// The encoded payload is not valid JSON
    #[error("arguments are not valid JSON: {0}")]
    InvalidJson(String),

    /// The payload decoded, but not to a mapping
    #[error("arguments decoded to {0} instead of an object")]
    NotAMapping(&'static str),
}

/// Why a task's expected actions could not be located.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroundTruthError {
    /// The recorded run itself failed (`info.error` is set)
    #[error("task run errored: {0}")]
    AgentError(String),

    /// None of the configured locations holds an action list
    #[error("no expected actions found (searched {0})")]
    Missing(String),

    /// An action list exists but could not be read
    #[error("expected actions are malformed: {0}")]
    Malformed(String),
}
