//! Stage 1: pull the listing and every post from the CMS into a snapshot.
//!
//! ```text
//! CMS  →  <temp>/snapshot.json   (listing states + post details + config)
//! ```
//!
//! ## Listing
//!
//! The seed page is queried with `DocumentQuery::listing`, then a
//! [`Paginator`] loads pages until the cursor runs out or `listing.max_pages`
//! loads have been made. Each successful load is recorded as a [`PageLoad`] so
//! the generate stage can rebuild the listing exactly as a reader would see it
//! after clicking "Carregar mais posts" that many times.
//!
//! ## Posts
//!
//! Every post reachable from the listing or from the uid-only query is pulled.
//! Posts fetched less than `posts.revalidate_minutes` ago are taken from the
//! [`PostCache`] instead of the CMS. Any CMS error aborts the pull.

use crate::cache::{CacheStats, PostCache, Revalidation};
use crate::cms::{CmsError, ContentApi, DocumentQuery};
use crate::config::SiteConfig;
use crate::paginator::{LoadOutcome, Paginator, display_order};
use crate::types::{Cursor, PostDetail, PostPage, PostSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

const SNAPSHOT_FILENAME: &str = "snapshot.json";

#[derive(Error, Debug)]
pub enum PullError {
    #[error(transparent)]
    Cms(#[from] CmsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the generate stage needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub listing: Listing,
    pub posts: Vec<PostDetail>,
    pub config: SiteConfig,
}

/// One successful "load more".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLoad {
    pub appended: usize,
    pub next_page: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub seed: PostPage,
    pub accumulated: Vec<PostSummary>,
    pub loads: Vec<PageLoad>,
}

/// The listing as displayed after some number of loads.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingState<'a> {
    pub posts: Vec<&'a PostSummary>,
    pub next_page: Option<&'a str>,
}

impl Listing {
    /// Seed state plus one state per load.
    pub fn state_count(&self) -> usize {
        self.loads.len() + 1
    }

    /// State after `loads` loads; `state(0)` is the seed alone.
    pub fn state(&self, loads: usize) -> Option<ListingState<'_>> {
        if loads > self.loads.len() {
            return None;
        }
        let shown: usize = self.loads[..loads].iter().map(|l| l.appended).sum();
        let shown = shown.min(self.accumulated.len());
        let next_page = match loads {
            0 => self.seed.next_page.as_deref(),
            n => self.loads[n - 1].next_page.as_deref(),
        };
        Some(ListingState {
            posts: display_order(&self.seed, &self.accumulated[..shown]).collect(),
            next_page,
        })
    }

    /// Uids of every listed post, in display order, duplicates included.
    pub fn uids(&self) -> impl Iterator<Item = &str> {
        display_order(&self.seed, &self.accumulated).map(|p| p.uid.as_str())
    }
}

/// Progress reported while pulling.
#[derive(Debug, Clone, PartialEq)]
pub enum PullEvent {
    /// A listing page arrived. `number` is 1 for the seed.
    ListingPage {
        number: usize,
        titles: Vec<String>,
        more: bool,
    },
    /// `max_pages` loads were made and the CMS still had a cursor.
    ListingTruncated { max_pages: usize },
    PostPulled {
        index: usize,
        uid: String,
        title: String,
        status: Revalidation,
    },
}

#[derive(Debug)]
pub struct PullResult {
    pub snapshot: Snapshot,
    pub cache_stats: CacheStats,
    pub truncated: bool,
}

fn emit(events: &Option<Sender<PullEvent>>, event: PullEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is printing
        let _ = tx.send(event);
    }
}

fn titles(posts: &[PostSummary]) -> Vec<String> {
    posts.iter().map(|p| p.title.clone()).collect()
}

/// Query the seed page and load up to `max_pages` pages after it.
///
/// Returns the listing and whether a cursor was left unfollowed.
pub async fn load_listing<A>(
    api: &A,
    config: &SiteConfig,
    events: &Option<Sender<PullEvent>>,
) -> Result<(Listing, bool), CmsError>
where
    A: ContentApi + ?Sized,
{
    let query = DocumentQuery::listing(&config.cms.document_type, config.cms.page_size);
    let seed = api.query_documents(&query).await?;
    emit(
        events,
        PullEvent::ListingPage {
            number: 1,
            titles: titles(&seed.results),
            more: seed.next_page.is_some(),
        },
    );

    let max_pages = config.listing.max_pages;
    let mut paginator = Paginator::new(&seed);
    let mut loads = Vec::new();
    while paginator.has_more() && loads.len() < max_pages {
        let before = paginator.accumulated().len();
        if let LoadOutcome::Appended(appended) = paginator.load_next_page(api).await? {
            emit(
                events,
                PullEvent::ListingPage {
                    number: loads.len() + 2,
                    titles: titles(&paginator.accumulated()[before..]),
                    more: paginator.has_more(),
                },
            );
            loads.push(PageLoad {
                appended,
                next_page: paginator.next_page().map(str::to_string),
            });
        }
    }

    let truncated = paginator.has_more();
    if truncated {
        tracing::warn!(max_pages, "listing truncated, the CMS has more pages");
        emit(events, PullEvent::ListingTruncated { max_pages });
    }

    let (accumulated, _) = paginator.into_parts();
    Ok((
        Listing {
            seed,
            accumulated,
            loads,
        },
        truncated,
    ))
}

/// Listing uids first, then any other uid the CMS knows, without repeats.
fn post_uids(listing: &Listing, all_uids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    listing
        .uids()
        .map(str::to_string)
        .chain(all_uids)
        .filter(|uid| seen.insert(uid.clone()))
        .collect()
}

/// Pull the listing and all posts. `now` is in Unix seconds.
pub async fn pull<A>(
    api: &A,
    config: &SiteConfig,
    cache: &mut PostCache,
    now: i64,
    events: Option<Sender<PullEvent>>,
) -> Result<PullResult, PullError>
where
    A: ContentApi + ?Sized,
{
    let doc_type = config.cms.document_type.as_str();
    let (listing, truncated) = load_listing(api, config, &events).await?;

    let all_uids = api.query_uids(doc_type).await?;
    let uids = post_uids(&listing, all_uids);
    tracing::debug!(count = uids.len(), "pulling posts");

    let max_age = i64::try_from(config.posts.revalidate_minutes.saturating_mul(60))
        .unwrap_or(i64::MAX);
    let mut cache_stats = CacheStats::default();
    let mut posts = Vec::with_capacity(uids.len());

    for (idx, uid) in uids.iter().enumerate() {
        let (post, status) = match cache.fresh(uid, now, max_age) {
            Some(post) => (post.clone(), Revalidation::Fresh),
            None => {
                let post = api.get_by_uid(doc_type, uid).await?;
                let status = cache.record(post.clone(), now)?;
                (post, status)
            }
        };
        cache_stats.count(status);
        emit(
            &events,
            PullEvent::PostPulled {
                index: idx + 1,
                uid: uid.clone(),
                title: post.title.clone(),
                status,
            },
        );
        posts.push(post);
    }

    cache.retain(&uids.iter().map(String::as_str).collect());

    Ok(PullResult {
        snapshot: Snapshot {
            listing,
            posts,
            config: config.clone(),
        },
        cache_stats,
        truncated,
    })
}

/// Run [`pull`] against the cache in `temp_dir` and write the snapshot there.
pub async fn pull_into<A>(
    api: &A,
    config: &SiteConfig,
    temp_dir: &Path,
    use_cache: bool,
    now: i64,
    events: Option<Sender<PullEvent>>,
) -> Result<PullResult, PullError>
where
    A: ContentApi + ?Sized,
{
    fs::create_dir_all(temp_dir)?;
    let mut cache = if use_cache {
        PostCache::load(temp_dir)
    } else {
        PostCache::empty()
    };

    let result = pull(api, config, &mut cache, now, events).await?;

    cache.save(temp_dir)?;
    let json = serde_json::to_string_pretty(&result.snapshot)?;
    fs::write(snapshot_path(temp_dir), json)?;
    Ok(result)
}

pub fn snapshot_path(temp_dir: &Path) -> PathBuf {
    temp_dir.join(SNAPSHOT_FILENAME)
}
