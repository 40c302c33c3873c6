//! Shared types used across both pipeline stages.
//!
//! These types are what the CMS client produces, what the pull stage writes
//! into `snapshot.json`, and what the generate stage reads back. Field names
//! are the crate's own; the Prismic wire shape lives in [`crate::cms::prismic`].

use serde::{Deserialize, Serialize};

/// Opaque reference to the next page of a listing query.
///
/// For Prismic this is a fully-qualified search URL. It is fetched as-is and
/// never parsed.
pub type Cursor = String;

/// A post as it appears in the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    /// Raw timestamp as delivered by the CMS, e.g. `2021-03-25T19:25:28+0000`.
    /// Absent for documents that were never published.
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// One page of a listing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    /// `None` iff this is the last page.
    pub next_page: Option<Cursor>,
    /// Summaries in the order the CMS returned them.
    pub results: Vec<PostSummary>,
}

/// Full post used by the reading view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub content: Vec<ContentSection>,
}

/// A headed section of a post body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// A structured text block (`paragraph`, `heading2`, `list-item`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
    /// Image blocks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image blocks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl RichTextBlock {
    /// A text block of the given type with no formatting.
    pub fn new(kind: &str, text: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("paragraph", text)
    }
}

/// Inline formatting over a character range of a block's text.
///
/// `start` is inclusive, `end` exclusive, both counted in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
