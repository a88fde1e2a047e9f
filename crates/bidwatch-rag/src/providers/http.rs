//! Default HTTP fetcher: reqwest + HTML reduction
//!
//! Reduces a page to title/text/links for the extractor. Title comes from a
//! selector cascade with og:title and `<title>` fallbacks; body text is the
//! longest candidate content block, skipping chrome elements.

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::error::{Error, Result};

use super::fetch::{FetchedPage, Fetcher, PageLink};

/// Title selectors tried in order
const TITLE_SELECTORS: &[&str] = &[
    "div.view-tit h2",
    "h2.tit",
    "div.board-view h2",
    "article h2",
    "h1",
    "h2",
];

/// Candidate main-content selectors; the longest non-empty text wins
const CONTENT_SELECTORS: &[&str] = &[
    "div.view-cont",
    "div.board-view",
    "article",
    "div#contents",
    "div#content",
    "section#content",
    "main",
];

/// Elements whose text is page chrome, not content
const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "header", "footer", "nav", "aside",
];

/// HTTP-backed page fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and user agent
    pub fn new(config: &FetcherConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", response.status())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        Ok(parse_page(url, &html))
    }
}

/// Reduce raw HTML to title/text/links
pub(crate) fn parse_page(base_url: &str, html: &str) -> FetchedPage {
    let doc = Html::parse_document(html);

    FetchedPage {
        title: extract_title(&doc),
        text: extract_main_text(&doc),
        links: extract_links(&doc, base_url),
    }
}

fn extract_title(doc: &Html) -> Option<String> {
    for raw in TITLE_SELECTORS {
        let selector = Selector::parse(raw).expect("invalid title selector");
        if let Some(el) = doc.select(&selector).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    let og = Selector::parse(r#"meta[property="og:title"]"#).expect("invalid og selector");
    if let Some(el) = doc.select(&og).next() {
        if let Some(content) = el.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }

    let title = Selector::parse("title").expect("invalid <title> selector");
    doc.select(&title)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn extract_main_text(doc: &Html) -> String {
    let mut candidates = Vec::new();
    for raw in CONTENT_SELECTORS {
        let selector = Selector::parse(raw).expect("invalid content selector");
        if let Some(el) = doc.select(&selector).next() {
            let text = element_text(el);
            if !text.is_empty() {
                candidates.push(text);
            }
        }
    }

    if let Some(longest) = candidates.into_iter().max_by_key(String::len) {
        return longest;
    }

    // Whole-document fallback
    let body = Selector::parse("body").expect("invalid body selector");
    doc.select(&body).next().map(element_text).unwrap_or_default()
}

fn extract_links(doc: &Html, base_url: &str) -> Vec<PageLink> {
    let anchor = Selector::parse("a[href]").expect("invalid anchor selector");
    let base = Url::parse(base_url).ok();

    doc.select(&anchor)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let absolute = match &base {
                Some(base) => base.join(href).ok()?.to_string(),
                None => href.to_string(),
            };
            let text = element_text(el);
            Some(PageLink {
                text: (!text.is_empty()).then_some(text),
                href: absolute,
            })
        })
        .collect()
}

/// Text of an element, skipping chrome subtrees, whitespace-collapsed
fn element_text(el: ElementRef) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(element) => {
                if SKIP_ELEMENTS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_cascade_prefers_board_heading() {
        let html = r#"
            <html><head><title>사이트명</title></head>
            <body><div class="view-tit"><h2>클라우드 지원사업 공고</h2></div></body></html>
        "#;
        let page = parse_page("https://example.org/notice/1", html);
        assert_eq!(page.title.as_deref(), Some("클라우드 지원사업 공고"));
    }

    #[test]
    fn test_title_falls_back_to_og_then_title() {
        let html = r#"
            <html><head>
              <meta property="og:title" content="OG 제목">
              <title>문서 제목</title>
            </head><body><p>본문</p></body></html>
        "#;
        let page = parse_page("https://example.org/", html);
        assert_eq!(page.title.as_deref(), Some("OG 제목"));

        let html = r#"<html><head><title>문서 제목</title></head><body><p>본문</p></body></html>"#;
        let page = parse_page("https://example.org/", html);
        assert_eq!(page.title.as_deref(), Some("문서 제목"));
    }

    #[test]
    fn test_main_text_picks_longest_block_and_skips_chrome() {
        let html = r#"
            <html><body>
              <nav>메뉴 목록</nav>
              <div id="content">짧은 안내</div>
              <div class="view-cont">
                사업 공고 본문입니다. 접수기간과 지원대상이 안내됩니다.
                <script>var x = 1;</script>
              </div>
            </body></html>
        "#;
        let page = parse_page("https://example.org/", html);
        assert!(page.text.contains("사업 공고 본문"));
        assert!(!page.text.contains("var x"));
        assert!(!page.text.contains("메뉴"));
    }

    #[test]
    fn test_links_are_absolutized() {
        let html = r#"
            <html><body>
              <a href="/files/notice.pdf">공고문</a>
              <a href="https://other.example.com/form.hwp"></a>
            </body></html>
        "#;
        let page = parse_page("https://example.org/board/1", html);
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].href, "https://example.org/files/notice.pdf");
        assert_eq!(page.links[0].text.as_deref(), Some("공고문"));
        assert_eq!(page.links[1].text, None);
    }
}
