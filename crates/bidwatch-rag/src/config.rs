//! Configuration for the pipeline
//!
//! All thresholds that the source material treated as tuning constants live
//! here as plain defaults. Nothing is read from the environment; callers
//! construct a [`PipelineConfig`] (or load one from TOML) and pass it in.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Vector index storage
    #[serde(default)]
    pub index: IndexConfig,
    /// Embedding service
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Structured-field extraction
    #[serde(default)]
    pub extractor: ExtractorConfig,
    /// Progressive acceptance filter
    #[serde(default)]
    pub filter: FilterConfig,
    /// Multi-signal ranking
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Routing decision thresholds
    #[serde(default)]
    pub router: RouterConfig,
    /// Default HTTP fetcher
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }
}

/// Vector index storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding chunks.jsonl, vectors.bin and ids.json
    pub dir: PathBuf,
    /// Similarity floor for search results (cosine, 0 disables)
    #[serde(default)]
    pub min_score: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("bidwatch")
                .join("index"),
            min_score: 0.0,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding service base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Batch size for embedding calls
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Delay before the single retry of a failed item
    pub retry_delay_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            batch_size: 8,
            timeout_secs: 30,
            retry_delay_ms: 250,
        }
    }
}

/// Structured-field extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Reject dates with a year below this
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Byte window searched around a date label (clamped to char boundaries)
    #[serde(default = "default_near_window")]
    pub near_window: usize,
}

fn default_min_year() -> i32 {
    2023
}
fn default_near_window() -> usize {
    120
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            near_window: default_near_window(),
        }
    }
}

/// Progressive filter stage thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum body length accepted by the strict stage without attachments
    #[serde(default = "default_strict_min_len")]
    pub strict_min_len: usize,
    /// Minimum body length accepted by the medium stage without attachments
    #[serde(default = "default_medium_min_len")]
    pub medium_min_len: usize,
    /// Minimum body length required by the loose stage
    #[serde(default = "default_loose_min_len")]
    pub loose_min_len: usize,
}

fn default_strict_min_len() -> usize {
    600
}
fn default_medium_min_len() -> usize {
    500
}
fn default_loose_min_len() -> usize {
    400
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            strict_min_len: default_strict_min_len(),
            medium_min_len: default_medium_min_len(),
            loose_min_len: default_loose_min_len(),
        }
    }
}

/// Ranking weights and deadline scoring parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Weight of the deadline-proximity signal
    pub weight_deadline: f32,
    /// Weight of the semantic-similarity signal
    pub weight_similarity: f32,
    /// Weight of the keyword-overlap signal
    pub weight_keyword: f32,
    /// Days ahead at which deadline proximity reaches zero
    pub deadline_horizon_days: i64,
    /// Informational default when a record has no close date
    pub missing_deadline_score: f32,
    /// Dampening factor for generic-title records without attachments
    pub generic_title_dampening: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weight_deadline: 0.6,
            weight_similarity: 0.25,
            weight_keyword: 0.15,
            deadline_horizon_days: 30,
            missing_deadline_score: 0.15,
            generic_title_dampening: 0.65,
        }
    }
}

/// Routing decision thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Number of hits requested from the quality-gate search
    pub top_k: usize,
    /// Minimum top-hit score for the gate to pass
    pub min_top: f32,
    /// Minimum number of hits above `min_top * 0.7` for the gate to pass
    pub min_covered: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            min_top: 0.25,
            min_covered: 3,
        }
    }
}

/// Default HTTP fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (bidwatch)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.ranking.weight_deadline, 0.6);
        assert_eq!(config.ranking.weight_similarity, 0.25);
        assert_eq!(config.ranking.weight_keyword, 0.15);
        assert_eq!(config.filter.strict_min_len, 600);
        assert_eq!(config.filter.medium_min_len, 500);
        assert_eq!(config.filter.loose_min_len, 400);
        assert_eq!(config.extractor.min_year, 2023);
        assert_eq!(config.router.min_top, 0.25);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: PipelineConfig = toml::from_str(
            r#"
            [router]
            top_k = 4
            min_top = 0.3
            min_covered = 2

            [filter]
            loose_min_len = 350
            "#,
        )
        .unwrap();
        assert_eq!(parsed.router.top_k, 4);
        assert_eq!(parsed.filter.loose_min_len, 350);
        assert_eq!(parsed.filter.strict_min_len, 600);
        assert_eq!(parsed.ranking.weight_deadline, 0.6);
    }
}
