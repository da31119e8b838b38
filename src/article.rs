use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything except the characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const DEFAULT_DESCRIPTION: &str = "Exploring knowledge from Wikipedia";

/// Free-text subject name, used verbatim for display and encoded for requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn encoded(&self) -> String {
        encode_component(&self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Topic {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub title: String,
    pub description: Option<String>,
    pub extract: String,
    pub thumbnail_url: Option<String>,
    pub canonical_page_url: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub last_modified: Option<String>,
}

impl ArticleSummary {
    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Calendar date of the last revision, when the API reported one.
    pub fn last_modified_date(&self) -> Option<&str> {
        self.last_modified
            .as_deref()
            .map(|stamp| stamp.split('T').next().unwrap_or(stamp))
            .filter(|date| !date.is_empty())
    }

    pub(crate) fn from_payload(payload: SummaryPayload, fallback_page_url: String) -> Self {
        Self {
            title: payload.title,
            description: payload.description,
            extract: payload.extract,
            thumbnail_url: payload.thumbnail.map(|thumb| thumb.source),
            canonical_page_url: payload
                .content_urls
                .map(|urls| urls.desktop.page)
                .unwrap_or(fallback_page_url),
            kind: payload.kind,
            last_modified: payload.timestamp,
        }
    }
}

/// One fetched article. `content` is the raw HTML body and is empty when the
/// full-content request failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub summary: ArticleSummary,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryPayload {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    thumbnail: Option<ThumbnailPayload>,
    #[serde(default)]
    content_urls: Option<ContentUrlsPayload>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailPayload {
    source: String,
}

#[derive(Debug, Deserialize)]
struct ContentUrlsPayload {
    desktop: PageUrlsPayload,
}

#[derive(Debug, Deserialize)]
struct PageUrlsPayload {
    page: String,
}
