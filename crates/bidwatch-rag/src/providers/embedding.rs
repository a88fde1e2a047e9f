//! Embedding provider trait

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Generates fixed-dimension vectors for text.
///
/// Implementations may fail transiently; callers own the retry and
/// degradation policy.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// with a native batch endpoint should override.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Embed `texts` in batches with per-item fallback.
///
/// A failed batch falls back to item-by-item calls; a failed item is
/// retried once after `retry_delay`. A failure that survives the retry
/// propagates to the caller.
pub async fn embed_all(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
    retry_delay: Duration,
) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(texts.len());
    let batch_size = batch_size.max(1);

    for batch in texts.chunks(batch_size) {
        match provider.embed_batch(batch).await {
            Ok(embedded) => vectors.extend(embedded),
            Err(batch_err) => {
                tracing::warn!(
                    provider = provider.name(),
                    "batch embed failed, falling back per item: {}",
                    batch_err
                );
                for text in batch {
                    match provider.embed(text).await {
                        Ok(vector) => vectors.push(vector),
                        Err(first_err) => {
                            tracing::warn!(
                                provider = provider.name(),
                                "embed failed, retrying once: {}",
                                first_err
                            );
                            tokio::time::sleep(retry_delay).await;
                            vectors.push(provider.embed(text).await?);
                        }
                    }
                }
            }
        }
    }

    Ok(vectors)
}
