//! bidwatch-core: flat inner-product vector index
//!
//! A dense, exact-scan vector index. Rows are stored L2-normalized so that
//! inner product equals cosine similarity. The index persists to a single
//! binary snapshot file and is rebuilt wholesale by its owner when the
//! embedding dimensionality changes.

pub mod error;
pub mod index;

pub use error::{Error, Result};
pub use index::{l2_normalize, FlatIndex};
