//! Answer-composition collaborator trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Hit;

/// Composes a markdown answer from retrieved hits (typically LLM-backed)
#[async_trait]
pub trait Composer: Send + Sync {
    /// Compose an answer for the query from the given hits
    async fn compose(&self, query: &str, hits: &[Hit]) -> Result<String>;
}
