//! Plan-synthesis collaborator trait

use async_trait::async_trait;

use crate::error::Result;

/// Synthesizes a collection plan for a query (typically LLM-backed).
///
/// Returns raw text; the router owns the tolerant parsing, so
/// implementations never need to guarantee well-formed JSON.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce a plan response for the query
    async fn plan(&self, query: &str) -> Result<String>;
}
