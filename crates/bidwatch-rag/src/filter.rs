//! Progressive acceptance filter over candidate notice URLs
//!
//! Stages trade precision for recall only as needed: escalation to a looser
//! stage happens only while the accepted set is still below `min_accept`.
//! Pages are fetched once and memoized; a failed fetch is "no candidate".

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::FilterConfig;
use crate::extract::{rules, FieldExtractor};
use crate::providers::{FetchedPage, Fetcher};
use crate::types::Notice;

/// Acceptance stage, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    /// Title keyword and (attachments or long body)
    Strict,
    /// Title or body keyword and (attachments or medium body)
    Medium,
    /// Any keyword signal (including query keywords) and minimum body
    Loose,
}

impl FilterStage {
    const ALL: [FilterStage; 3] = [Self::Strict, Self::Medium, Self::Loose];
}

/// An accepted notice with the stage that first accepted it
#[derive(Debug, Clone)]
pub struct Collected {
    /// The extracted notice
    pub notice: Notice,
    /// First stage that accepted this URL
    pub stage: FilterStage,
}

/// Fetched-and-extracted candidate, kept with its body for stage predicates
struct Candidate {
    notice: Notice,
    body_lower: String,
}

/// Multi-stage acceptance filter
pub struct ProgressiveFilter {
    fetcher: Arc<dyn Fetcher>,
    extractor: FieldExtractor,
    config: FilterConfig,
}

impl ProgressiveFilter {
    /// Create a filter over the given fetcher and extractor
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: FieldExtractor, config: FilterConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Collect accepted notices from the candidate URLs.
    ///
    /// Returns whatever was accumulated when no stage reaches `min_accept`,
    /// possibly nothing; never an error.
    pub async fn collect(
        &self,
        candidate_urls: &[String],
        query_keywords: &[String],
        min_accept: usize,
    ) -> Vec<Collected> {
        let mut memo: HashMap<String, Option<Candidate>> = HashMap::new();
        let mut accepted_urls: HashSet<String> = HashSet::new();
        let mut accepted: Vec<Collected> = Vec::new();

        let query_lower: Vec<String> = query_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        for stage in FilterStage::ALL {
            if accepted.len() >= min_accept {
                break;
            }

            for url in candidate_urls {
                if accepted_urls.contains(url) {
                    continue;
                }

                if !memo.contains_key(url) {
                    let candidate = match self.fetcher.fetch(url).await {
                        Ok(page) => Some(self.candidate_from_page(url, page)),
                        Err(e) => {
                            tracing::warn!(url = %url, "fetch failed, dropping candidate: {}", e);
                            None
                        }
                    };
                    memo.insert(url.clone(), candidate);
                }

                let Some(candidate) = memo.get(url).and_then(Option::as_ref) else {
                    continue;
                };

                if self.accepts(stage, candidate, &query_lower) {
                    tracing::debug!(url = %url, stage = ?stage, "candidate accepted");
                    accepted_urls.insert(url.clone());
                    accepted.push(Collected {
                        notice: candidate.notice.clone(),
                        stage,
                    });
                }
            }
        }

        accepted
    }

    fn candidate_from_page(&self, url: &str, page: FetchedPage) -> Candidate {
        let notice = self
            .extractor
            .extract(page.title.as_deref(), url, &page.text, &page.links);
        Candidate {
            notice,
            body_lower: page.text.to_lowercase(),
        }
    }

    fn accepts(&self, stage: FilterStage, candidate: &Candidate, query_keywords: &[String]) -> bool {
        let notice = &candidate.notice;

        // Navigation-like titles never pass, whatever the other signals say
        if rules::BANNED_TITLES.iter().any(|t| notice.title.trim() == *t) {
            return false;
        }

        let len = notice.text_len;
        let has_attachments = notice.attach_cnt > 0;
        let title_keyword = rules::NOTICE_TITLE_KEYWORDS
            .iter()
            .any(|k| notice.title.contains(k));
        let body_keyword = rules::NOTICE_BODY_KEYWORDS
            .iter()
            .any(|k| candidate.body_lower.contains(k));

        match stage {
            FilterStage::Strict => {
                title_keyword && (has_attachments || len >= self.config.strict_min_len)
            }
            FilterStage::Medium => {
                (title_keyword || body_keyword)
                    && (has_attachments || len >= self.config.medium_min_len)
            }
            FilterStage::Loose => {
                let query_keyword = query_keywords
                    .iter()
                    .any(|k| candidate.body_lower.contains(k));
                (title_keyword || body_keyword || query_keyword) && len >= self.config.loose_min_len
            }
        }
    }
}
