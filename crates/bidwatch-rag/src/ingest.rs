//! Folding collected notices into store chunks
//!
//! Notices live only for the duration of a query run; what survives is
//! their folded chunk form, upserted into the vector store so future
//! queries can answer from local retrieval.

use std::collections::HashSet;

use crate::types::{Chunk, Notice};

/// Record kind attached to folded notice chunks
pub const NOTICE_KIND: &str = "government";

/// Drop later duplicates of the same URL, preserving order
pub fn dedupe_by_url(notices: Vec<Notice>) -> Vec<Notice> {
    let mut seen = HashSet::new();
    notices
        .into_iter()
        .filter(|n| seen.insert(n.url.clone()))
        .collect()
}

/// Fold notices into chunks with stable ids.
///
/// One chunk per notice: the summary plus the requirements excerpt, keyed
/// by `(url, 0)` so re-collecting the same notice re-derives the same id
/// and upsert stays idempotent.
pub fn chunks_from_notices(notices: &[Notice]) -> Vec<Chunk> {
    notices
        .iter()
        .map(|notice| {
            let mut text = notice.summary.clone();
            if let Some(requirements) = &notice.requirements {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(requirements);
            }
            Chunk::with_stable_id(&notice.url, 0, text, &notice.title, NOTICE_KIND)
        })
        .collect()
}
