//! Shared test utilities: small builders for the data model.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let seed = page(&["first-post"], Some("page2url"));
//! let post = detail("first-post", &[("Intro", &["Hello there"])]);
//! ```

use crate::config::SiteConfig;
use crate::types::{ContentSection, PostDetail, PostPage, PostSummary, RichTextBlock};

pub const TEST_ENDPOINT: &str = "https://blog.cdn.prismic.io/api/v2";

/// A summary whose title is derived from the uid.
pub fn summary(uid: &str) -> PostSummary {
    PostSummary {
        uid: uid.to_string(),
        first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
        title: format!("Title of {uid}"),
        subtitle: format!("Subtitle of {uid}"),
        author: "Joseph Oliveira".to_string(),
    }
}

/// A listing page of summaries built with [`summary`].
pub fn page(uids: &[&str], next_page: Option<&str>) -> PostPage {
    PostPage {
        next_page: next_page.map(str::to_string),
        results: uids.iter().map(|uid| summary(uid)).collect(),
    }
}

/// A post with one section per `(heading, paragraphs)` pair.
pub fn detail(uid: &str, sections: &[(&str, &[&str])]) -> PostDetail {
    PostDetail {
        uid: uid.to_string(),
        first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
        title: format!("Title of {uid}"),
        banner_url: format!("https://images.prismic.io/blog/{uid}.png"),
        author: "Joseph Oliveira".to_string(),
        content: sections
            .iter()
            .map(|(heading, paragraphs)| ContentSection {
                heading: heading.to_string(),
                body: paragraphs
                    .iter()
                    .map(|text| RichTextBlock::paragraph(*text))
                    .collect(),
            })
            .collect(),
    }
}

/// Stock config pointing at a test endpoint.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.cms.endpoint = TEST_ENDPOINT.to_string();
    config
}
