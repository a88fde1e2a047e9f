//! Typed records flowing through the pipeline

pub mod chunk;
pub mod notice;
pub mod route;

pub use chunk::{stable_chunk_id, Chunk, Hit};
pub use notice::{Attachment, ContentType, Notice};
pub use route::{PlanStep, Route, RouteDecision};
