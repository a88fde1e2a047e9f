//! Page fetch collaborator trait

use async_trait::async_trait;

use crate::error::Result;

/// A hyperlink found on a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Anchor text, if any
    pub text: Option<String>,
    /// Absolute link target
    pub href: String,
}

/// A fetched page reduced to what extraction needs
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// Best-effort page title
    pub title: Option<String>,
    /// Main body text, whitespace-collapsed
    pub text: String,
    /// Links found on the page
    pub links: Vec<PageLink>,
}

/// Fetches a URL and reduces it to title/text/links.
///
/// Failures are expected; the progressive filter treats a failed fetch as
/// "no candidate" rather than an error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch and reduce one page
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}
