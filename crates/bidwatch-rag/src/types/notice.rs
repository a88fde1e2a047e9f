//! Structured notice records extracted from scraped documents

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attachment count at or above which a notice is attachment-centric
const ATTACHMENT_HEAVY_COUNT: usize = 3;
/// Body length below which a notice is attachment-centric
const THIN_TEXT_LEN: usize = 300;

/// A document attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name (falls back to the URL's last path segment)
    pub name: String,
    /// Download URL
    pub url: String,
}

/// Derived classification of a notice's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Body text carries the substance
    Text,
    /// Attachments carry the substance (thin body or many files)
    Attachment,
}

impl ContentType {
    /// Fixed threshold rule: attachment-centric when there are three or
    /// more attachments or the body is under 300 chars.
    pub fn classify(attach_cnt: usize, text_len: usize) -> Self {
        if attach_cnt >= ATTACHMENT_HEAVY_COUNT || text_len < THIN_TEXT_LEN {
            Self::Attachment
        } else {
            Self::Text
        }
    }
}

/// A structured record extracted from an announcement document.
///
/// Notices are created fresh per query run; they are not persisted except
/// by being folded into chunks and upserted into the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    /// Document title (falls back to the URL)
    pub title: String,
    /// Document URL
    pub url: String,
    /// Announcement date, if a labeled date was found
    pub announce_date: Option<NaiveDate>,
    /// Submission deadline, if a labeled date was found
    pub close_date: Option<NaiveDate>,
    /// Issuing agency
    pub agency: Option<String>,
    /// Budget string (number + currency unit, or label-adjacent text)
    pub budget: Option<String>,
    /// Representative requirements excerpt
    pub requirements: Option<String>,
    /// Document attachments
    pub attachments: Vec<Attachment>,
    /// Derived content classification
    pub content_type: ContentType,
    /// Body length in chars
    pub text_len: usize,
    /// Attachment count
    pub attach_cnt: usize,
    /// Body prefix used for display and ranking
    pub summary: String,
}

impl Notice {
    /// Names of all attachments, for keyword matching
    pub fn attachment_names(&self) -> impl Iterator<Item = &str> {
        self.attachments.iter().map(|a| a.name.as_str())
    }
}
