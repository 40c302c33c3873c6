//! Prismic REST API v2 client.
//!
//! Every search request needs a content *ref*. The client resolves the
//! repository's master ref from the API entry point on first use and reuses
//! it for the lifetime of the client, so one build reads one consistent
//! version of the content.
//!
//! Listing cursors are the `next_page` URLs Prismic returns. They already
//! carry the ref, predicate and page number and are fetched verbatim.
//!
//! Access tokens travel as the `access_token` query parameter. They are
//! redacted from logs and error messages.

use super::api::{CmsError, ContentApi, DocumentQuery};
use crate::config::CmsConfig;
use crate::types::{ContentSection, PostDetail, PostPage, PostSummary, RichTextBlock};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Largest page size Prismic accepts; used when walking every uid.
const UID_PAGE_SIZE: u32 = 100;

/// Error bodies longer than this are cut in error messages.
const MAX_ERROR_BODY: usize = 200;

pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CmsError::fetch(&config.endpoint, e))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            master_ref: OnceCell::new(),
        })
    }

    /// The repository's published content ref. Fetched once, then memoized.
    pub async fn master_ref(&self) -> Result<&str, CmsError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let url = entry_url(&self.endpoint, self.access_token.as_deref())?;
                let info: ApiInfo = self.get_json(url.as_str()).await?;
                let master = info
                    .refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.reference)
                    .ok_or_else(|| {
                        CmsError::fetch(redact(url.as_str()), "repository has no master ref")
                    })?;
                tracing::debug!(master_ref = %master, "resolved master ref");
                Ok::<_, CmsError>(master)
            })
            .await?;
        Ok(reference.as_str())
    }

    async fn search<D: DeserializeOwned>(
        &self,
        predicate: &str,
        fetch: &[String],
        page_size: u32,
    ) -> Result<SearchResponse<D>, CmsError> {
        let master_ref = self.master_ref().await?;
        let url = search_url(
            &self.endpoint,
            master_ref,
            self.access_token.as_deref(),
            predicate,
            fetch,
            page_size,
        )?;
        self.get_json(url.as_str()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CmsError> {
        let shown = redact(url);
        tracing::debug!(url = %shown, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CmsError::fetch(&shown, e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::fetch(
                shown,
                format!("HTTP {status}: {}", truncate(body.trim(), MAX_ERROR_BODY)),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CmsError::fetch(shown, e.without_url()))
    }
}

#[async_trait]
impl ContentApi for PrismicClient {
    async fn query_documents(&self, query: &DocumentQuery) -> Result<PostPage, CmsError> {
        let response: SearchResponse<SummaryData> = self
            .search(&type_predicate(&query.doc_type), &query.fetch, query.page_size)
            .await?;
        Ok(into_page(response))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<PostPage, CmsError> {
        let response: SearchResponse<SummaryData> = self.get_json(cursor).await?;
        Ok(into_page(response))
    }

    async fn query_uids(&self, doc_type: &str) -> Result<Vec<String>, CmsError> {
        let fetch = [format!("{doc_type}.uid")];
        let mut response: SearchResponse<serde_json::Value> = self
            .search(&type_predicate(doc_type), &fetch, UID_PAGE_SIZE)
            .await?;

        let mut uids = Vec::new();
        loop {
            uids.extend(response.results.into_iter().filter_map(|doc| doc.uid));
            match response.next_page {
                Some(cursor) => response = self.get_json(&cursor).await?,
                None => break,
            }
        }
        Ok(uids)
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<PostDetail, CmsError> {
        let predicate = format!("[at(my.{}.uid, \"{}\")]", doc_type, escape(uid));
        let response: SearchResponse<DetailData> = self.search(&predicate, &[], 1).await?;

        let doc = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })?;
        Ok(into_detail(doc, uid))
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<D> {
    next_page: Option<String>,
    results: Vec<Document<D>>,
}

#[derive(Debug, Deserialize)]
struct Document<D> {
    #[serde(default)]
    id: String,
    uid: Option<String>,
    first_publication_date: Option<String>,
    data: D,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryData {
    title: Option<String>,
    subtitle: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetailData {
    title: Option<String>,
    author: Option<String>,
    banner: Option<ImageField>,
    content: Vec<ContentField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageField {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentField {
    heading: Option<String>,
    body: Vec<RichTextBlock>,
}

fn into_page(response: SearchResponse<SummaryData>) -> PostPage {
    let results = response
        .results
        .into_iter()
        .filter_map(|doc| {
            let Some(uid) = doc.uid else {
                tracing::warn!(id = %doc.id, "skipping listed document without uid");
                return None;
            };
            Some(PostSummary {
                uid,
                first_publication_date: doc.first_publication_date,
                title: doc.data.title.unwrap_or_default(),
                subtitle: doc.data.subtitle.unwrap_or_default(),
                author: doc.data.author.unwrap_or_default(),
            })
        })
        .collect();

    PostPage {
        next_page: response.next_page,
        results,
    }
}

fn into_detail(doc: Document<DetailData>, requested_uid: &str) -> PostDetail {
    let data = doc.data;
    PostDetail {
        uid: doc.uid.unwrap_or_else(|| requested_uid.to_string()),
        first_publication_date: doc.first_publication_date,
        title: data.title.unwrap_or_default(),
        banner_url: data.banner.and_then(|b| b.url).unwrap_or_default(),
        author: data.author.unwrap_or_default(),
        content: data
            .content
            .into_iter()
            .map(|section| ContentSection {
                heading: section.heading.unwrap_or_default(),
                body: section.body,
            })
            .collect(),
    }
}

// ============================================================================
// URL helpers
// ============================================================================

fn type_predicate(doc_type: &str) -> String {
    format!("[at(document.type, \"{}\")]", escape(doc_type))
}

/// Escape a value for use inside a quoted predicate argument.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn parse_url(raw: &str) -> Result<Url, CmsError> {
    Url::parse(raw).map_err(|e| CmsError::fetch(raw, e))
}

fn entry_url(endpoint: &str, access_token: Option<&str>) -> Result<Url, CmsError> {
    let mut url = parse_url(endpoint)?;
    if let Some(token) = access_token {
        url.query_pairs_mut().append_pair("access_token", token);
    }
    Ok(url)
}

/// Build a `documents/search` URL. `predicate` is a single `[...]` predicate;
/// the `q` parameter wraps it in the outer list.
fn search_url(
    endpoint: &str,
    master_ref: &str,
    access_token: Option<&str>,
    predicate: &str,
    fetch: &[String],
    page_size: u32,
) -> Result<Url, CmsError> {
    let mut url = parse_url(&format!("{endpoint}/documents/search"))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("ref", master_ref);
        query.append_pair("q", &format!("[{predicate}]"));
        if !fetch.is_empty() {
            query.append_pair("fetch", &fetch.join(","));
        }
        query.append_pair("pageSize", &page_size.to_string());
        if let Some(token) = access_token {
            query.append_pair("access_token", token);
        }
    }
    Ok(url)
}

/// Replace the value of an `access_token` query parameter.
fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.query_pairs().any(|(key, _)| key == "access_token") {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "access_token" {
                "redacted".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
