//! Chunk and search-hit records

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the hex id derived from the content hash
const CHUNK_ID_LEN: usize = 16;

/// Stable chunk id: hex digest over `(source, sequence_index)`.
///
/// Re-deriving the same pair always yields the same id, which is what makes
/// upsert idempotent.
pub fn stable_chunk_id(source: &str, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"#");
    hasher.update(index.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..CHUNK_ID_LEN].to_string()
}

/// A unit of ingested text with stable identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable content-hash id (upsert key)
    pub id: String,
    /// Text content
    pub text: String,
    /// Origin of the text (URL or file path)
    pub source: String,
    /// Page number within the source, if paginated
    #[serde(default)]
    pub page: Option<u32>,
    /// Record kind (e.g. "government", "web")
    #[serde(default)]
    pub kind: String,
    /// Display title
    #[serde(default)]
    pub title: String,
}

impl Chunk {
    /// Create a chunk with an id derived from `(source, index)`
    pub fn with_stable_id(
        source: impl Into<String>,
        index: usize,
        text: impl Into<String>,
        title: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        let source = source.into();
        Self {
            id: stable_chunk_id(&source, index),
            text: text.into(),
            source,
            page: None,
            kind: kind.into(),
            title: title.into(),
        }
    }
}

/// Maximum title length carried on a hit
const HIT_TITLE_LEN: usize = 140;
/// Maximum summary length carried on a hit
const HIT_SUMMARY_LEN: usize = 300;

/// A search result row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// Chunk id
    pub id: String,
    /// Chunk title, truncated
    pub title: String,
    /// URL of the source (same as `source` for scraped chunks)
    pub url: String,
    /// Origin of the chunk
    pub source: String,
    /// Text prefix used for display and ranking
    pub summary: String,
    /// Full chunk text
    pub text: String,
    /// Page number, if any
    pub page: Option<u32>,
    /// Record kind
    pub kind: String,
    /// Cosine similarity against the query, roughly [-1, 1]
    pub score: f32,
}

impl Hit {
    /// Build a hit from a stored chunk and its similarity score
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            id: chunk.id.clone(),
            title: truncate_chars(&chunk.title, HIT_TITLE_LEN),
            url: chunk.source.clone(),
            source: chunk.source.clone(),
            summary: truncate_chars(&chunk.text, HIT_SUMMARY_LEN),
            text: chunk.text.clone(),
            page: chunk.page,
            kind: chunk.kind.clone(),
            score,
        }
    }
}

/// Truncate to at most `max` chars on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_is_deterministic() {
        let a = stable_chunk_id("https://example.org/notice/1", 0);
        let b = stable_chunk_id("https://example.org/notice/1", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), CHUNK_ID_LEN);
    }

    #[test]
    fn test_stable_id_varies_with_index_and_source() {
        let base = stable_chunk_id("https://example.org/notice/1", 0);
        assert_ne!(base, stable_chunk_id("https://example.org/notice/1", 1));
        assert_ne!(base, stable_chunk_id("https://example.org/notice/2", 0));
    }

    #[test]
    fn test_hit_truncates_title_and_summary() {
        let chunk = Chunk::with_stable_id(
            "src",
            0,
            "가".repeat(400),
            "제".repeat(200),
            "government",
        );
        let hit = Hit::from_chunk(&chunk, 0.9);
        assert_eq!(hit.title.chars().count(), 140);
        assert_eq!(hit.summary.chars().count(), 300);
        assert_eq!(hit.text.chars().count(), 400);
    }
}
