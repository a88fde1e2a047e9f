//! Dense flat index with exact inner-product search

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// L2-normalize a vector in place.
///
/// Near-zero vectors are left untouched rather than divided by ~0.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 1e-9 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Flat vector index storing rows contiguously.
///
/// Search is an exact scan: every stored row is scored by inner product
/// against the query. Rows are expected to be L2-normalized by the caller
/// (see [`l2_normalize`]) so scores are cosine similarities in [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    /// Row dimensionality
    dim: usize,
    /// Row-major vector data, `len() * dim` floats
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for the given dimensionality
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Row dimensionality
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Check if the index has no rows
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one row
    pub fn push(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// Append a batch of rows
    pub fn extend(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            self.push(vector)?;
        }
        Ok(())
    }

    /// Exact top-k search by inner product.
    ///
    /// Returns up to `min(k, len)` `(row, score)` pairs in descending score
    /// order; equal scores keep ascending row order. An empty index returns
    /// an empty vector, never an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(row, stored)| {
                let score: f32 = stored.iter().zip(query).map(|(a, b)| a * b).sum();
                (row, score)
            })
            .collect();

        // Stable sort keeps ascending row order for equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k.min(self.len()));
        Ok(scored)
    }

    /// Persist the index to a binary snapshot file
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::Encode(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load an index from a binary snapshot file.
    ///
    /// A snapshot whose data length is not a multiple of its dimensionality
    /// is a torn write and is rejected with [`Error::CorruptSnapshot`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let (index, _len): (Self, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| Error::Decode(e.to_string()))?;
        if index.dim == 0 && !index.data.is_empty() {
            return Err(Error::corrupt("zero dimensionality with non-empty data"));
        }
        if index.dim > 0 && index.data.len() % index.dim != 0 {
            return Err(Error::corrupt(format!(
                "data length {} is not a multiple of dim {}",
                index.data.len(),
                index.dim
            )));
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_leaves_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_push_rejects_wrong_dim() {
        let mut index = FlatIndex::new(3);
        let err = index.push(&[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_search_orders_by_inner_product() {
        let mut index = FlatIndex::new(2);
        index.push(&[1.0, 0.0]).unwrap();
        index.push(&[0.0, 1.0]).unwrap();
        index.push(&[0.707, 0.707]).unwrap();

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 0);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].0, 2);
        assert_eq!(hits[2].0, 1);
    }

    #[test]
    fn test_search_empty_index_returns_empty() {
        let index = FlatIndex::new(4);
        assert!(index.search(&[0.0; 4], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_caps_k_at_len() {
        let mut index = FlatIndex::new(2);
        index.push(&[1.0, 0.0]).unwrap();
        let hits = index.search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_equal_scores_keep_row_order() {
        let mut index = FlatIndex::new(2);
        index.push(&[0.0, 1.0]).unwrap();
        index.push(&[0.0, 1.0]).unwrap();
        let hits = index.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.bin");

        let mut index = FlatIndex::new(3);
        index.push(&[1.0, 0.0, 0.0]).unwrap();
        index.push(&[0.0, 1.0, 0.0]).unwrap();
        index.save(&path).unwrap();

        let loaded = FlatIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dim(), 3);
        let hits = loaded.search(&[0.0, 1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].0, 1);
    }
}
