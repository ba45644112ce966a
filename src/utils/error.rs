// src/utils/error.rs
use serde_json;
use std::io;
use thiserror::Error;

/// Main error type for the miner
///
/// Exhausting a search range or cancelling a search are not errors; those are
/// reported through [`crate::SearchOutcome`]. Everything here is a failure the
/// caller must handle.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Malformed task input (byte lengths, non-positive difficulty, bad range)
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Unexpected failure while evaluating a hash; fatal to the session
    #[error("Hash computation failed: {0}")]
    ComputationError(String),

    /// A session was used outside its lifecycle (e.g. searched twice)
    #[error("Session error: {0}")]
    SessionError(String),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Worker pool construction or thread execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

/// Converts hex decoding errors into MinerError
///
/// Raised while decoding the task seed and identity.
/// Wraps the original error in an `InputError` variant.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}

/// Converts worker pool build errors into MinerError
impl From<rayon::ThreadPoolBuildError> for MinerError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        MinerError::TaskError(format!("Worker pool build failed: {}", e))
    }
}
