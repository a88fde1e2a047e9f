//! bidwatch-rag: retrieval, ranking and routing core for notice QA
//!
//! Four pieces do the real work: a persisted cosine-similarity vector store
//! over [`bidwatch_core::FlatIndex`], a rule-table field extractor for noisy
//! announcement documents, a progressive acceptance filter over candidate
//! URLs, and a multi-signal ranker feeding a routing decision layer.
//! Everything external — embeddings, fetching, plan synthesis, answer
//! composition — sits behind the traits in [`providers`].

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod ingest;
pub mod plan;
pub mod providers;
pub mod ranker;
pub mod router;
pub mod store;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use extract::FieldExtractor;
pub use filter::{Collected, FilterStage, ProgressiveFilter};
pub use ranker::{Rankable, Ranked, Ranker};
pub use router::Router;
pub use store::VectorStore;
pub use types::{Chunk, Hit, Notice, PlanStep, Route, RouteDecision};

/// Re-export the index core for convenience
pub use bidwatch_core;
