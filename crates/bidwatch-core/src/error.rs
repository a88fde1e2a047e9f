//! Error types for the index core

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Index errors
#[derive(Debug, Error)]
pub enum Error {
    /// Vector dimensionality does not match the index
    #[error("dimension mismatch: index is {expected}, vector is {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Snapshot file is inconsistent (torn write, wrong length)
    #[error("corrupt index snapshot: {0}")]
    CorruptSnapshot(String),

    /// Snapshot encoding failed
    #[error("snapshot encode error: {0}")]
    Encode(String),

    /// Snapshot decoding failed
    #[error("snapshot decode error: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a corrupt-snapshot error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptSnapshot(message.into())
    }
}
