//! Error types for history encoding and decoding.
//!
//! Stack operations themselves never fail: misuse (undo inside a macro,
//! an unmatched `end_macro`, ...) is logged and ignored. Only the
//! serialization pipeline surfaces errors.

use thiserror::Error;

/// Main error type for envelope operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Corruption detected: {0}")]
    Corruption(String),
}

impl From<base64::DecodeError> for HistoryError {
    fn from(e: base64::DecodeError) -> Self {
        HistoryError::Encoding(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for HistoryError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        HistoryError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for HistoryError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        HistoryError::Deserialization(e.to_string())
    }
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
