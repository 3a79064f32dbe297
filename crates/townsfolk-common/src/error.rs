//! Error types for Townsfolk.

use thiserror::Error;

/// Top-level error type for operations at the edges of the simulation
/// (files, decoding, configuration). Simulation ticks themselves never fail.
#[derive(Debug, Error)]
pub enum TownsfolkError {
    /// Configuration could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schedule table could not be loaded
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Result type alias for Townsfolk operations.
pub type TownsfolkResult<T> = Result<T, TownsfolkError>;
