//! Structured-field extraction from noisy document text
//!
//! One consolidated parser: label lists, windows and thresholds come from
//! the rule table in [`rules`]. A field with no label near a valid value is
//! `None` — the extractor never guesses.

pub mod rules;

use chrono::NaiveDate;
use regex::Regex;

use crate::config::ExtractorConfig;
use crate::providers::fetch::PageLink;
use crate::types::chunk::truncate_chars;
use crate::types::{Attachment, ContentType, Notice};

/// Chars trimmed from the ends of a label-adjacent value
const VALUE_TRIM: &[char] = &[' ', ':', '：', '-', '—', '\n', '\r', '\t'];

/// Chars terminating a label-adjacent value
const VALUE_STOP: &[char] = &['。', '.', '\n', '\r', ';', '|'];

/// Rule-table driven field extractor
pub struct FieldExtractor {
    min_year: i32,
    near_window: usize,
    date_re: Regex,
    budget_re: Regex,
    ws_re: Regex,
}

impl FieldExtractor {
    /// Create an extractor with the given bounds
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            min_year: config.min_year,
            near_window: config.near_window,
            date_re: Regex::new(rules::DATE_TOKEN).expect("invalid date pattern"),
            budget_re: Regex::new(rules::BUDGET_TOKEN).expect("invalid budget pattern"),
            ws_re: Regex::new(r"\s{2,}").expect("invalid whitespace pattern"),
        }
    }

    /// Extract a structured notice from a scraped page
    pub fn extract(
        &self,
        title: Option<&str>,
        url: &str,
        text: &str,
        links: &[PageLink],
    ) -> Notice {
        let (announce_date, close_date) = self.parse_dates(text);
        let agency = self.parse_agency(text);
        let budget = self.parse_budget(text);
        let requirements = self.parse_requirements(text);
        let attachments = parse_attachments(links);

        let text_len = text.chars().count();
        let attach_cnt = attachments.len();

        Notice {
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(url)
                .to_string(),
            url: url.to_string(),
            announce_date,
            close_date,
            agency,
            budget,
            requirements,
            attachments,
            content_type: ContentType::classify(attach_cnt, text_len),
            text_len,
            attach_cnt,
            summary: truncate_chars(text, rules::SUMMARY_LEN),
        }
    }

    /// Announcement and close dates.
    ///
    /// A period label with two or more in-window dates wins and yields
    /// (earliest, latest). Otherwise each role is resolved independently by
    /// the most recent date near one of its labels.
    pub fn parse_dates(&self, text: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
        if text.is_empty() {
            return (None, None);
        }

        for label in rules::RANGE_LABELS {
            for (pos, _) in text.match_indices(label) {
                let seg = self.window_around(text, pos, pos + label.len());
                let mut dates = self.dates_in(seg);
                if dates.len() >= 2 {
                    dates.sort();
                    return (dates.first().copied(), dates.last().copied());
                }
            }
        }

        let announce = self.best_near(text, rules::ANNOUNCE_LABELS);
        let close = self.best_near(text, rules::CLOSE_LABELS);
        (announce, close)
    }

    /// Issuing agency: first label from the priority list with adjacent text
    pub fn parse_agency(&self, text: &str) -> Option<String> {
        self.first_after_label(text, rules::AGENCY_LABELS, rules::AGENCY_VALUE_LEN)
    }

    /// Budget: an explicit `<number><unit>` amount beats label-adjacent text
    pub fn parse_budget(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.budget_re.captures(text) {
            let number = caps.get(1).map_or("", |m| m.as_str());
            let digits: String = number.chars().filter(char::is_ascii_digit).collect();
            if digits.parse::<u64>().map(|n| n > 0).unwrap_or(false) {
                let unit = caps.get(2).map_or("", |m| m.as_str());
                return Some(format!("{}{}", number, unit));
            }
        }
        self.first_after_label(text, rules::BUDGET_LABELS, rules::BUDGET_VALUE_LEN)
    }

    /// Representative requirements excerpt: the single longest window among
    /// all requirement-label occurrences, capped.
    pub fn parse_requirements(&self, text: &str) -> Option<String> {
        let mut best: Option<String> = None;
        for label in rules::REQUIREMENT_LABELS {
            for (pos, _) in text.match_indices(label) {
                let start = floor_chars(text, pos, rules::REQUIREMENTS_WINDOW);
                let end = ceil_chars(text, pos + label.len(), rules::REQUIREMENTS_WINDOW);
                let seg = self.ws_re.replace_all(&text[start..end], " ");
                let seg = seg.trim();
                if seg.is_empty() {
                    continue;
                }
                if best.as_ref().map_or(true, |b| seg.len() > b.len()) {
                    best = Some(seg.to_string());
                }
            }
        }
        best.map(|b| truncate_chars(&b, rules::REQUIREMENTS_CAP))
    }

    /// Most recent valid date inside a window around any of `labels`
    fn best_near(&self, text: &str, labels: &[&str]) -> Option<NaiveDate> {
        let mut best: Option<NaiveDate> = None;
        for label in labels {
            for (pos, _) in text.match_indices(label) {
                let seg = self.window_around(text, pos, pos + label.len());
                for date in self.dates_in(seg) {
                    if best.map_or(true, |b| date > b) {
                        best = Some(date);
                    }
                }
            }
        }
        best
    }

    /// All valid in-bounds dates in a segment, in occurrence order
    fn dates_in(&self, seg: &str) -> Vec<NaiveDate> {
        self.date_re
            .captures_iter(seg)
            .filter_map(|caps| {
                let year: i32 = caps.get(1)?.as_str().parse().ok()?;
                if year < self.min_year {
                    return None;
                }
                let month: u32 = caps.get(2)?.as_str().parse().ok()?;
                let day: u32 = caps.get(3)?.as_str().parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            })
            .collect()
    }

    /// Longest cleaned value following any of `labels`
    fn first_after_label(&self, text: &str, labels: &[&str], max_len: usize) -> Option<String> {
        let mut best: Option<String> = None;
        for label in labels {
            for (pos, _) in text.match_indices(label) {
                let start = pos + label.len();
                let end = ceil_chars(text, start, max_len);
                let seg = text[start..end].trim_matches(VALUE_TRIM);
                let seg = match seg.find(VALUE_STOP) {
                    Some(stop) => &seg[..stop],
                    None => seg,
                };
                let seg = self.ws_re.replace_all(seg, " ");
                let seg = seg.trim();
                if seg.is_empty() {
                    continue;
                }
                if best.as_ref().map_or(true, |b| seg.len() > b.len()) {
                    best = Some(seg.to_string());
                }
            }
        }
        best
    }

    /// Window of `near_window` chars on each side of `[start, end)`
    fn window_around<'t>(&self, text: &'t str, start: usize, end: usize) -> &'t str {
        let lo = floor_chars(text, start, self.near_window);
        let hi = ceil_chars(text, end, self.near_window);
        &text[lo..hi]
    }
}

/// Filter a link list down to document attachments.
///
/// Name falls back to the URL's last path segment; results are deduplicated
/// by `(name, url)` preserving order.
pub fn parse_attachments(links: &[PageLink]) -> Vec<Attachment> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for link in links {
        let url = link.href.trim();
        if url.is_empty() {
            continue;
        }
        let lower = url.to_lowercase();
        if !rules::ATTACHMENT_EXTS.iter().any(|ext| lower.ends_with(ext)) {
            continue;
        }
        let name = link
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| url.rsplit('/').next().unwrap_or(url))
            .to_string();
        if seen.insert((name.clone(), url.to_string())) {
            out.push(Attachment {
                name,
                url: url.to_string(),
            });
        }
    }
    out
}

/// Byte index `n` chars before `byte_pos`
fn floor_chars(text: &str, byte_pos: usize, n: usize) -> usize {
    if n == 0 {
        return byte_pos;
    }
    text[..byte_pos]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte index `n` chars after `byte_pos`
fn ceil_chars(text: &str, byte_pos: usize, n: usize) -> usize {
    text[byte_pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| byte_pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(&ExtractorConfig::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_label_yields_earliest_and_latest() {
        let text = "본 사업의 접수기간: 2025-02-10 ~ 2025-01-10 까지 신청 바랍니다.";
        let (announce, close) = extractor().parse_dates(text);
        assert_eq!(announce, Some(date(2025, 1, 10)));
        assert_eq!(close, Some(date(2025, 2, 10)));
    }

    #[test]
    fn test_individual_labels_resolve_each_role() {
        // Labels far enough apart that their windows do not overlap
        let text = format!(
            "공고일: 2025.01.05 {} 마감일: 2025/02/01 18:00 까지",
            "안내 ".repeat(70)
        );
        let (announce, close) = extractor().parse_dates(&text);
        assert_eq!(announce, Some(date(2025, 1, 5)));
        assert_eq!(close, Some(date(2025, 2, 1)));
    }

    #[test]
    fn test_compact_date_token() {
        let text = "마감일 20250215 까지";
        let (_, close) = extractor().parse_dates(text);
        assert_eq!(close, Some(date(2025, 2, 15)));
    }

    #[test]
    fn test_unlabeled_date_is_never_guessed() {
        let text = "행사는 2025-03-01 에 열립니다.";
        assert_eq!(extractor().parse_dates(text), (None, None));
    }

    #[test]
    fn test_dates_below_min_year_are_rejected() {
        let text = "공고일: 2019-01-01";
        assert_eq!(extractor().parse_dates(text), (None, None));
    }

    #[test]
    fn test_label_outside_window_does_not_bind_date() {
        let padding = "가".repeat(200);
        let text = format!("마감일 안내 {} 2025-02-01", padding);
        assert_eq!(extractor().parse_dates(&text), (None, None));
    }

    #[test]
    fn test_agency_after_label() {
        let text = "주관기관: 정보통신산업진흥원 | 문의처: 02-1234-5678";
        assert_eq!(
            extractor().parse_agency(text),
            Some("정보통신산업진흥원".to_string())
        );
    }

    #[test]
    fn test_budget_prefers_explicit_amount() {
        let text = "지원규모: 참가기업 모집, 총 12.5억원 규모";
        assert_eq!(extractor().parse_budget(text), Some("12.5억원".to_string()));
    }

    #[test]
    fn test_budget_zero_amount_falls_back_to_label() {
        let text = "0원 부담, 예산: 별도 공지";
        assert_eq!(extractor().parse_budget(text), Some("별도 공지".to_string()));
    }

    #[test]
    fn test_requirements_picks_longest_window_and_caps() {
        let long_tail = "상세 내용 ".repeat(100);
        let text = format!("요건 충족 필요. 지원대상 중소기업 및 스타트업 {}", long_tail);
        let req = extractor().parse_requirements(&text).unwrap();
        assert!(req.contains("지원대상"));
        assert!(req.chars().count() <= rules::REQUIREMENTS_CAP);
    }

    #[test]
    fn test_requirements_absent_without_labels() {
        assert_eq!(extractor().parse_requirements("일반 본문"), None);
    }

    #[test]
    fn test_attachments_filter_name_fallback_and_dedup() {
        let links = vec![
            PageLink {
                text: Some("공고문".to_string()),
                href: "https://example.org/files/notice.pdf".to_string(),
            },
            PageLink {
                text: None,
                href: "https://example.org/files/form.hwp".to_string(),
            },
            PageLink {
                text: Some("공고문".to_string()),
                href: "https://example.org/files/notice.pdf".to_string(),
            },
            PageLink {
                text: Some("홈으로".to_string()),
                href: "https://example.org/index.html".to_string(),
            },
        ];
        let attachments = parse_attachments(&links);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].name, "공고문");
        assert_eq!(attachments[1].name, "form.hwp");
    }

    #[test]
    fn test_extract_builds_full_notice() {
        let text = format!(
            "제2025-01호 클라우드 바우처 지원사업 공고. 접수기간: 2025-01-10 ~ 2025-02-10. \
             주관기관: 정보통신산업진흥원. 총사업비 30억원. 지원대상: 국내 중소기업. {}",
            "추가 안내 ".repeat(60)
        );
        let links = vec![PageLink {
            text: Some("공고문.pdf".to_string()),
            href: "https://example.org/notice.pdf".to_string(),
        }];
        let notice = extractor().extract(
            Some("클라우드 바우처 지원사업 공고"),
            "https://example.org/notice/1",
            &text,
            &links,
        );
        assert_eq!(notice.announce_date, Some(date(2025, 1, 10)));
        assert_eq!(notice.close_date, Some(date(2025, 2, 10)));
        assert_eq!(notice.budget, Some("30억원".to_string()));
        assert_eq!(notice.attach_cnt, 1);
        assert_eq!(notice.content_type, ContentType::Text);
        assert!(notice.summary.chars().count() <= rules::SUMMARY_LEN);
    }
}
