//! External collaborator interfaces and default implementations
//!
//! The pipeline talks to everything outside the process through these
//! traits: embeddings, page fetching, plan synthesis and answer
//! composition. Defaults are provided where a plain HTTP client is enough.

pub mod compose;
pub mod embedding;
pub mod fetch;
pub mod http;
pub mod ollama;
pub mod planner;

pub use compose::Composer;
pub use embedding::EmbeddingProvider;
pub use fetch::{FetchedPage, Fetcher, PageLink};
pub use http::HttpFetcher;
pub use ollama::OllamaEmbedder;
pub use planner::Planner;
