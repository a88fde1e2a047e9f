//! Persisted vector store: chunk metadata, id-order list and flat index
//!
//! Three co-owned artifacts live in the index directory and are always
//! loaded and saved together:
//!
//!   chunks.jsonl   metadata rows keyed by chunk id, insertion-ordered
//!   vectors.bin    FlatIndex snapshot, row-major
//!   ids.json       row position -> chunk id
//!
//! The id list and the index must stay length-synchronized. A mismatch is
//! a structural invariant violation and forces a full rebuild from
//! metadata; it is never partially repaired.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use bidwatch_core::{l2_normalize, FlatIndex};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::{embed_all, EmbeddingProvider};
use crate::types::{Chunk, Hit};

const META_FILE: &str = "chunks.jsonl";
const VECTORS_FILE: &str = "vectors.bin";
const IDS_FILE: &str = "ids.json";

/// In-memory image of the three persisted artifacts
struct StoreState {
    /// Metadata rows, insertion-ordered (merge preserves first insertion)
    chunks: Vec<Chunk>,
    /// Chunk id -> position in `chunks`
    by_id: HashMap<String, usize>,
    /// Row position in the index -> chunk id
    ids: Vec<String>,
    /// The vector index; `None` until the first build
    index: Option<FlatIndex>,
}

impl StoreState {
    fn ntotal(&self) -> usize {
        self.index.as_ref().map_or(0, FlatIndex::len)
    }
}

/// Persisted chunk store with embedded vector search
pub struct VectorStore {
    dir: PathBuf,
    min_score: f32,
    batch_size: usize,
    retry_delay: Duration,
    embedder: Arc<dyn EmbeddingProvider>,
    inner: RwLock<StoreState>,
}

impl VectorStore {
    /// Open (or create) a store in the configured directory.
    ///
    /// Loads all three artifacts; a length mismatch between the id list and
    /// the index triggers a full rebuild here, which is why opening needs
    /// the embedder.
    pub async fn open(
        config: &PipelineConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let dir = config.index.dir.clone();
        std::fs::create_dir_all(&dir)?;

        let chunks = load_meta(&dir.join(META_FILE))?;
        let by_id = index_by_id(&chunks);
        let ids = load_ids(&dir.join(IDS_FILE))?;
        let index = load_index(&dir.join(VECTORS_FILE));

        let store = Self {
            dir,
            min_score: config.index.min_score,
            batch_size: config.embeddings.batch_size,
            retry_delay: Duration::from_millis(config.embeddings.retry_delay_ms),
            embedder,
            inner: RwLock::new(StoreState {
                chunks,
                by_id,
                ids,
                index,
            }),
        };

        let mismatch = {
            let state = store.inner.read();
            let rows = state.ntotal();
            let id_count = state.ids.len();
            (state.index.is_some() || id_count > 0) && rows != id_count
        };
        if mismatch {
            tracing::error!(
                "id list and index are out of sync, rebuilding index from metadata"
            );
            store.rebuild().await?;
        }

        Ok(store)
    }

    /// Merge chunks by id and index any new ones.
    ///
    /// Returns `(total_rows, added_rows)`. Metadata is merged and persisted
    /// before any embedding happens, so an embedding failure leaves the
    /// merge in place and only skips the index update.
    pub async fn upsert(&self, chunks: &[Chunk]) -> Result<(usize, usize)> {
        if chunks.is_empty() {
            return Ok((self.ntotal(), 0));
        }

        // 1) merge-by-id, last write wins, order preserved
        let (merged, known, fresh_build) = {
            let mut state = self.inner.write();
            for chunk in chunks {
                let existing = state.by_id.get(&chunk.id).copied();
                match existing {
                    Some(pos) => state.chunks[pos] = chunk.clone(),
                    None => {
                        let pos = state.chunks.len();
                        state.by_id.insert(chunk.id.clone(), pos);
                        state.chunks.push(chunk.clone());
                    }
                }
            }
            save_meta(&self.dir.join(META_FILE), &state.chunks)?;

            let known: std::collections::HashSet<String> = state.ids.iter().cloned().collect();
            (state.chunks.clone(), known, state.index.is_none())
        };

        // 2) first build embeds everything
        if fresh_build {
            let added = merged.len();
            let (index, ids) = self.build_index(&merged).await?;
            let total = index.len();
            self.commit(index, ids)?;
            debug_assert_eq!(total, added);
            return Ok((total, added));
        }

        // 3) append-only path for unseen ids
        let new_items: Vec<Chunk> = merged
            .iter()
            .filter(|c| !known.contains(&c.id))
            .cloned()
            .collect();
        if new_items.is_empty() {
            return Ok((self.ntotal(), 0));
        }

        let texts: Vec<String> = new_items.iter().map(|c| c.text.clone()).collect();
        let mut vectors = embed_all(
            self.embedder.as_ref(),
            &texts,
            self.batch_size,
            self.retry_delay,
        )
        .await?;
        for vector in &mut vectors {
            l2_normalize(vector);
        }

        // 4) embedding dimensionality changed: rebuild everything
        let index_dim = self.inner.read().index.as_ref().map(FlatIndex::dim);
        if let (Some(dim), Some(first)) = (index_dim, vectors.first()) {
            if first.len() != dim {
                tracing::warn!(
                    old_dim = dim,
                    new_dim = first.len(),
                    "embedding dimensionality changed, rebuilding index"
                );
                let (index, ids) = self.build_index(&merged).await?;
                let total = index.len();
                self.commit(index, ids)?;
                return Ok((total, merged.len() - known.len()));
            }
        }

        // 5) incremental append; id list and index grow together
        let mut state = self.inner.write();
        {
            let index = state
                .index
                .as_mut()
                .ok_or_else(|| Error::store_invariant("index vanished during upsert"))?;
            index.extend(&vectors)?;
        }
        for item in &new_items {
            state.ids.push(item.id.clone());
        }
        let total = state.ntotal();
        save_index(&self.dir.join(VECTORS_FILE), state.index.as_ref())?;
        save_ids(&self.dir.join(IDS_FILE), &state.ids)?;
        Ok((total, new_items.len()))
    }

    /// Top-k cosine search over the stored chunks.
    ///
    /// An empty index yields an empty list, never an error.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Hit>> {
        if self.ntotal() == 0 {
            return Ok(Vec::new());
        }

        let mut query_vec = embed_all(
            self.embedder.as_ref(),
            &[query.to_string()],
            self.batch_size,
            self.retry_delay,
        )
        .await?
        .remove(0);
        l2_normalize(&mut query_vec);

        let state = self.inner.read();
        let Some(index) = state.index.as_ref() else {
            return Ok(Vec::new());
        };

        let k = k.max(1).min(index.len());
        let rows = index.search(&query_vec, k)?;

        let mut hits = Vec::with_capacity(rows.len());
        for (row, score) in rows {
            if score < self.min_score {
                continue;
            }
            let Some(id) = state.ids.get(row) else {
                continue;
            };
            let Some(&pos) = state.by_id.get(id) else {
                continue;
            };
            hits.push(Hit::from_chunk(&state.chunks[pos], score));
        }
        Ok(hits)
    }

    /// Row count, 0 when no index has been built
    pub fn ntotal(&self) -> usize {
        self.inner.read().ntotal()
    }

    /// Drop the index and id list, keeping metadata
    pub fn reset_index(&self) -> Result<()> {
        let mut state = self.inner.write();
        state.index = None;
        state.ids.clear();
        remove_if_present(&self.dir.join(VECTORS_FILE))?;
        remove_if_present(&self.dir.join(IDS_FILE))?;
        Ok(())
    }

    /// Re-embed all metadata and rebuild the index. Returns the row count.
    pub async fn rebuild(&self) -> Result<usize> {
        let merged = self.inner.read().chunks.clone();
        let (index, ids) = self.build_index(&merged).await?;
        let total = index.len();
        self.commit(index, ids)?;
        Ok(total)
    }

    async fn build_index(&self, chunks: &[Chunk]) -> Result<(FlatIndex, Vec<String>)> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut vectors = embed_all(
            self.embedder.as_ref(),
            &texts,
            self.batch_size,
            self.retry_delay,
        )
        .await?;
        for vector in &mut vectors {
            l2_normalize(vector);
        }

        let dim = vectors.first().map_or(0, Vec::len);
        let mut index = FlatIndex::new(dim);
        index.extend(&vectors)?;
        let ids = chunks.iter().map(|c| c.id.clone()).collect();
        Ok((index, ids))
    }

    fn commit(&self, index: FlatIndex, ids: Vec<String>) -> Result<()> {
        let mut state = self.inner.write();
        save_index(&self.dir.join(VECTORS_FILE), Some(&index))?;
        save_ids(&self.dir.join(IDS_FILE), &ids)?;
        state.index = Some(index);
        state.ids = ids;
        Ok(())
    }
}

fn index_by_id(chunks: &[Chunk]) -> HashMap<String, usize> {
    chunks
        .iter()
        .enumerate()
        .map(|(pos, c)| (c.id.clone(), pos))
        .collect()
}

fn load_meta(path: &Path) -> Result<Vec<Chunk>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    let mut chunks = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        chunks.push(serde_json::from_str(line)?);
    }
    Ok(chunks)
}

fn save_meta(path: &Path, chunks: &[Chunk]) -> Result<()> {
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&serde_json::to_string(chunk)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn load_ids(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn save_ids(path: &Path, ids: &[String]) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(ids)?)?;
    Ok(())
}

/// Load the index snapshot; a torn or unreadable snapshot is treated as
/// absent so the caller's invariant check forces a rebuild.
fn load_index(path: &Path) -> Option<FlatIndex> {
    if !path.exists() {
        return None;
    }
    match FlatIndex::load(path) {
        Ok(index) => Some(index),
        Err(e) => {
            tracing::error!("failed to load index snapshot: {}", e);
            None
        }
    }
}

fn save_index(path: &Path, index: Option<&FlatIndex>) -> Result<()> {
    if let Some(index) = index {
        index.save(path)?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
