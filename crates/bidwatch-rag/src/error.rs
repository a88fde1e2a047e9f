//! Error types for the pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding generation failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Structural invariant violation in the persisted store
    #[error("Store invariant violation: {0}")]
    StoreInvariant(String),

    /// Page fetch failed
    #[error("Fetch failed for '{url}': {message}")]
    Fetch { url: String, message: String },

    /// Planner call failed
    #[error("Planner error: {0}")]
    Planner(String),

    /// Answer composition failed
    #[error("Composer error: {0}")]
    Composer(String),

    /// Core index error
    #[error("Index error: {0}")]
    Index(#[from] bidwatch_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a store invariant error
    pub fn store_invariant(message: impl Into<String>) -> Self {
        Self::StoreInvariant(message.into())
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a planner error
    pub fn planner(message: impl Into<String>) -> Self {
        Self::Planner(message.into())
    }

    /// Create a composer error
    pub fn composer(message: impl Into<String>) -> Self {
        Self::Composer(message.into())
    }
}
