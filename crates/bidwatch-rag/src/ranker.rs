//! Multi-signal ranking of candidate records
//!
//! Scores combine deadline proximity, semantic similarity against the query
//! and keyword overlap. Components are recomputed on every call, never
//! cached across queries.

use chrono::NaiveDate;
use regex::RegexBuilder;
use std::sync::Arc;
use std::time::Duration;

use bidwatch_core::l2_normalize;

use crate::config::RankingConfig;
use crate::error::Result;
use crate::extract::rules;
use crate::providers::embedding::{embed_all, EmbeddingProvider};
use crate::types::{Hit, Notice};

/// A record the ranker can score
pub trait Rankable {
    /// Display title
    fn title(&self) -> &str;
    /// Short text used for semantic similarity
    fn summary(&self) -> &str;
    /// Attachment names, if the record has any
    fn attachment_names(&self) -> Vec<&str> {
        Vec::new()
    }
    /// Submission deadline, if the record has one
    fn close_date(&self) -> Option<NaiveDate> {
        None
    }
}

impl Rankable for Notice {
    fn title(&self) -> &str {
        &self.title
    }

    fn summary(&self) -> &str {
        &self.summary
    }

    fn attachment_names(&self) -> Vec<&str> {
        self.attachments.iter().map(|a| a.name.as_str()).collect()
    }

    fn close_date(&self) -> Option<NaiveDate> {
        self.close_date
    }
}

impl Rankable for Hit {
    fn title(&self) -> &str {
        &self.title
    }

    fn summary(&self) -> &str {
        &self.summary
    }
}

/// A record with its recomputed score components
#[derive(Debug, Clone)]
pub struct Ranked<R> {
    /// The scored record
    pub record: R,
    /// Weighted total
    pub score: f32,
    /// Deadline-proximity component
    pub score_deadline: f32,
    /// Semantic-similarity component
    pub score_sim: f32,
    /// Keyword-overlap component
    pub score_kw: f32,
}

/// Multi-signal ranker
pub struct Ranker {
    embedder: Arc<dyn EmbeddingProvider>,
    config: RankingConfig,
    today: NaiveDate,
    batch_size: usize,
    retry_delay: Duration,
}

impl Ranker {
    /// Create a ranker scoring deadlines relative to the current date
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: RankingConfig) -> Self {
        Self {
            embedder,
            config,
            today: chrono::Local::now().date_naive(),
            batch_size: 8,
            retry_delay: Duration::from_millis(250),
        }
    }

    /// Pin "today" for deterministic deadline scoring
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Score and sort records, best first.
    ///
    /// The sort is stable: equal totals keep input order.
    pub async fn rank<R: Rankable + Clone>(
        &self,
        query: &str,
        records: &[R],
        keywords: &[String],
    ) -> Result<Vec<Ranked<R>>> {
        if records.is_empty() {
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

        let texts: Vec<String> = records
            .iter()
            .map(|r| format!("{} {}", r.title(), r.summary()).trim().to_string())
            .collect();
        let mut record_vecs = embed_all(
            self.embedder.as_ref(),
            &texts,
            self.batch_size,
            self.retry_delay,
        )
        .await?;
        for vec in &mut record_vecs {
            l2_normalize(vec);
        }

        let mut ranked: Vec<Ranked<R>> = records
            .iter()
            .zip(record_vecs)
            .map(|(record, vec)| {
                let score_sim = dot(&query_vec, &vec);
                let score_deadline = self.deadline_score(record.close_date());
                let score_kw = self.keyword_score(record, keywords);

                let mut score = self.config.weight_deadline * score_deadline
                    + self.config.weight_similarity * score_sim
                    + self.config.weight_keyword * score_kw;

                if self.is_generic_without_attachments(record) {
                    score *= self.config.generic_title_dampening;
                }

                Ranked {
                    record: record.clone(),
                    score,
                    score_deadline,
                    score_sim,
                    score_kw,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    /// Linear ramp peaking on the due date, zero when past or far out
    fn deadline_score(&self, close_date: Option<NaiveDate>) -> f32 {
        let Some(close) = close_date else {
            return self.config.missing_deadline_score;
        };
        let horizon = self.config.deadline_horizon_days;
        let days_left = (close - self.today).num_days();
        if days_left < 0 || days_left >= horizon {
            0.0
        } else {
            (horizon - days_left) as f32 / horizon as f32
        }
    }

    /// Fraction of non-stopword keywords found in title + summary +
    /// attachment names. Word-boundary matches count full weight, bare
    /// substring containment counts half.
    fn keyword_score<R: Rankable>(&self, record: &R, keywords: &[String]) -> f32 {
        let keywords: Vec<&str> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty() && !rules::KEYWORD_STOPWORDS.contains(&k.to_lowercase().as_str()))
            .collect();
        if keywords.is_empty() {
            return 0.0;
        }

        let mut haystack = format!("{} {}", record.title(), record.summary());
        for name in record.attachment_names() {
            haystack.push(' ');
            haystack.push_str(name);
        }
        let haystack_lower = haystack.to_lowercase();

        let mut matched = 0.0f32;
        for keyword in &keywords {
            let bounded = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword)))
                .case_insensitive(true)
                .build();
            match bounded {
                Ok(re) if re.is_match(&haystack) => matched += 1.0,
                _ => {
                    if haystack_lower.contains(&keyword.to_lowercase()) {
                        matched += 0.5;
                    }
                }
            }
        }

        (matched / keywords.len() as f32).min(1.0)
    }

    fn is_generic_without_attachments<R: Rankable>(&self, record: &R) -> bool {
        rules::GENERIC_TITLES.contains(&record.title().trim())
            && record.attachment_names().is_empty()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::Attachment;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Deterministic embedder: looks up exact texts, falls back to a fixed
    /// direction so unrelated texts have low similarity.
    struct MapEmbedder {
        map: HashMap<String, Vec<f32>>,
    }

    impl MapEmbedder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Arc<Self> {
            Arc::new(Self {
                map: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MapEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self
                .map
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0, 0.0, 1.0]))
        }

        fn name(&self) -> &str {
            "map"
        }
    }

    /// Embedder that always fails, for error-path coverage
    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("service down"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn ranker_with(embedder: Arc<dyn EmbeddingProvider>) -> Ranker {
        Ranker::new(embedder, RankingConfig::default())
            .with_today(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    fn notice(title: &str, summary: &str) -> Notice {
        Notice {
            title: title.to_string(),
            url: format!("https://example.org/{}", title),
            announce_date: None,
            close_date: None,
            agency: None,
            budget: None,
            requirements: None,
            attachments: Vec::new(),
            content_type: crate::types::ContentType::Text,
            text_len: summary.chars().count(),
            attach_cnt: 0,
            summary: summary.to_string(),
        }
    }

    #[test]
    fn test_deadline_score_boundaries() {
        let ranker = ranker_with(MapEmbedder::new(&[]));
        let day = |d: i64| NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() + chrono::Duration::days(d);

        assert_eq!(ranker.deadline_score(Some(day(0))), 1.0);
        let near = ranker.deadline_score(Some(day(29)));
        assert!((near - 1.0 / 30.0).abs() < 1e-6);
        assert_eq!(ranker.deadline_score(Some(day(30))), 0.0);
        assert_eq!(ranker.deadline_score(Some(day(-1))), 0.0);
        assert_eq!(ranker.deadline_score(None), 0.15);
    }

    #[test]
    fn test_keyword_score_empty_keywords_is_zero() {
        let ranker = ranker_with(MapEmbedder::new(&[]));
        let record = notice("클라우드 공고", "본문");
        assert_eq!(ranker.keyword_score(&record, &[]), 0.0);
    }

    #[test]
    fn test_keyword_score_word_boundary_beats_substring() {
        let ranker = ranker_with(MapEmbedder::new(&[]));

        let bounded = notice("cloud voucher program", "apply now");
        assert_eq!(
            ranker.keyword_score(&bounded, &["cloud".to_string()]),
            1.0
        );

        // No word boundary inside a fused Hangul compound: half weight
        let fused = notice("클라우드바우처", "신청 안내");
        assert_eq!(
            ranker.keyword_score(&fused, &["클라우드".to_string()]),
            0.5
        );

        let absent = notice("데이터 사업", "신청 안내");
        assert_eq!(ranker.keyword_score(&absent, &["cloud".to_string()]), 0.0);
    }

    #[test]
    fn test_keyword_score_counts_attachment_names() {
        let ranker = ranker_with(MapEmbedder::new(&[]));
        let mut record = notice("지원사업", "본문 안내");
        record.attachments.push(Attachment {
            name: "양식 form".to_string(),
            url: "https://example.org/form.hwp".to_string(),
        });
        record.attach_cnt = 1;
        assert_eq!(ranker.keyword_score(&record, &["form".to_string()]), 1.0);
    }

    #[test]
    fn test_keyword_score_ignores_stopwords() {
        let ranker = ranker_with(MapEmbedder::new(&[]));
        let record = notice("클라우드 공고", "본문");
        // "관련" is a stopword; only "클라우드" counts and it matches fully
        let score = ranker.keyword_score(
            &record,
            &["관련".to_string(), "클라우드".to_string()],
        );
        assert_eq!(score, 1.0);
    }

    #[tokio::test]
    async fn test_rank_orders_by_weighted_total() {
        let embedder = MapEmbedder::new(&[
            ("클라우드", vec![1.0, 0.0, 0.0]),
            ("클라우드 지원사업 공고 클라우드 바우처 신청", vec![1.0, 0.0, 0.0]),
            ("데이터센터 안내 데이터센터 구축", vec![0.0, 1.0, 0.0]),
        ]);
        let ranker = ranker_with(embedder);

        let records = vec![
            notice("데이터센터 안내", "데이터센터 구축"),
            notice("클라우드 지원사업 공고", "클라우드 바우처 신청"),
        ];
        let ranked = ranker.rank("클라우드", &records, &[]).await.unwrap();

        assert_eq!(ranked[0].record.title, "클라우드 지원사업 공고");
        assert!((ranked[0].score_sim - 1.0).abs() < 1e-6);
        assert!(ranked[0].score > ranked[1].score);
        // deadline-less records get the informational default
        assert_eq!(ranked[0].score_deadline, 0.15);
    }

    #[tokio::test]
    async fn test_rank_deadline_dominates_with_default_weights() {
        let embedder = MapEmbedder::new(&[]);
        let ranker = ranker_with(embedder);

        let mut due_soon = notice("마감 임박 사업", "신청 안내");
        due_soon.close_date = NaiveDate::from_ymd_opt(2025, 6, 3);
        let far_out = notice("마감 여유 사업", "신청 안내");

        let records = vec![far_out, due_soon];
        let ranked = ranker.rank("질의", &records, &[]).await.unwrap();
        assert_eq!(ranked[0].record.title, "마감 임박 사업");
    }

    #[tokio::test]
    async fn test_generic_title_without_attachments_is_dampened() {
        let embedder = MapEmbedder::new(&[]);
        let ranker = ranker_with(embedder);

        let generic = notice("공지사항", "일반 안내");
        let mut generic_with_file = notice("공지사항", "일반 안내");
        generic_with_file.attachments.push(Attachment {
            name: "공고문.pdf".to_string(),
            url: "https://example.org/a.pdf".to_string(),
        });
        generic_with_file.attach_cnt = 1;

        let records = vec![generic, generic_with_file];
        let ranked = ranker.rank("질의", &records, &[]).await.unwrap();

        // Same signals otherwise; only the attachment-free one is dampened
        assert_eq!(ranked[0].record.attach_cnt, 1);
        let damped = ranked[1].score;
        let full = ranked[0].score;
        assert!((damped - full * 0.65).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_equal_scores_preserve_input_order() {
        let embedder = MapEmbedder::new(&[]);
        let ranker = ranker_with(embedder);

        let records = vec![notice("첫번째 사업", "안내"), notice("두번째 사업", "안내")];
        let ranked = ranker.rank("질의", &records, &[]).await.unwrap();
        assert_eq!(ranked[0].record.title, "첫번째 사업");
        assert_eq!(ranked[1].record.title, "두번째 사업");
    }

    #[tokio::test]
    async fn test_rank_propagates_persistent_embedding_failure() {
        let ranker = ranker_with(Arc::new(FailingEmbedder));
        let records = vec![notice("사업 공고", "안내")];
        let result = ranker.rank("질의", &records, &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rank_empty_records_is_empty() {
        let ranker = ranker_with(MapEmbedder::new(&[]));
        let ranked: Vec<Ranked<Notice>> = ranker.rank("질의", &[], &[]).await.unwrap();
        assert!(ranked.is_empty());
    }
}
