//! The content API boundary.
//!
//! [`ContentApi`] is the narrow interface the rest of the crate uses to talk
//! to the CMS: four operations, nothing about predicates, refs or HTTP. The
//! production implementation is [`PrismicClient`](super::prismic::PrismicClient);
//! tests use [`tests::RecordingCms`].

use crate::types::{PostDetail, PostPage};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CmsError {
    /// Network failure, non-2xx status, or a body that could not be decoded.
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("No {doc_type} document with uid '{uid}'")]
    NotFound { doc_type: String, uid: String },
}

impl CmsError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Parameters of a listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub doc_type: String,
    /// Fields to fetch, qualified with the type (`post.title`).
    pub fetch: Vec<String>,
    pub page_size: u32,
}

impl DocumentQuery {
    /// The listing query: title, subtitle and author of every document of
    /// `doc_type`, `page_size` per page.
    pub fn listing(doc_type: &str, page_size: u32) -> Self {
        Self {
            doc_type: doc_type.to_string(),
            fetch: ["title", "subtitle", "author"]
                .iter()
                .map(|field| format!("{doc_type}.{field}"))
                .collect(),
            page_size,
        }
    }
}

/// Operations the blog needs from the CMS.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// First page of a listing query.
    async fn query_documents(&self, query: &DocumentQuery) -> Result<PostPage, CmsError>;

    /// The page behind a cursor previously returned as `next_page`.
    async fn fetch_page(&self, cursor: &str) -> Result<PostPage, CmsError>;

    /// Every uid of the given type, in CMS order.
    async fn query_uids(&self, doc_type: &str) -> Result<Vec<String>, CmsError>;

    /// A single document. [`CmsError::NotFound`] if no document has `uid`.
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<PostDetail, CmsError>;
}
