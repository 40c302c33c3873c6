//! Incremental pagination over the post listing.
//!
//! The first listing page (the *seed*) is fetched on its own and always shown
//! first. A [`Paginator`] starts from the seed's cursor and accumulates every
//! page loaded after it:
//!
//! ```text
//! displayed = seed.results ++ accumulated
//! "load more" offered  <=>  next_page.is_some()
//! ```
//!
//! Loads only ever append, in the order the CMS returns them. A failed load
//! leaves both the accumulated list and the cursor exactly as they were, so
//! the caller can retry or give up without cleanup. `load_next_page` takes
//! `&mut self`, which rules out two loads of the same paginator overlapping.

use crate::cms::{CmsError, ContentApi};
use crate::types::{Cursor, PostPage, PostSummary};

/// What a call to [`Paginator::load_next_page`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and this many summaries were appended.
    Appended(usize),
    /// There was no cursor; nothing was fetched.
    NothingToLoad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
    accumulated: Vec<PostSummary>,
    next_page: Option<Cursor>,
}

impl Paginator {
    /// Start after `seed`. The seed's own results are not accumulated.
    pub fn new(seed: &PostPage) -> Self {
        Self {
            accumulated: Vec::new(),
            next_page: seed.next_page.clone(),
        }
    }

    pub fn accumulated(&self) -> &[PostSummary] {
        &self.accumulated
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether a "load more" affordance should be offered.
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the page behind the current cursor and append its results.
    pub async fn load_next_page<A>(&mut self, api: &A) -> Result<LoadOutcome, CmsError>
    where
        A: ContentApi + ?Sized,
    {
        let Some(cursor) = self.next_page.as_deref() else {
            return Ok(LoadOutcome::NothingToLoad);
        };

        let page = api.fetch_page(cursor).await?;
        let appended = page.results.len();
        tracing::debug!(appended, more = page.next_page.is_some(), "loaded listing page");

        self.accumulated.extend(page.results);
        self.next_page = page.next_page;
        Ok(LoadOutcome::Appended(appended))
    }

    /// Everything a listing shows, in display order.
    pub fn displayed<'a>(&'a self, seed: &'a PostPage) -> impl Iterator<Item = &'a PostSummary> {
        display_order(seed, &self.accumulated)
    }

    pub fn into_parts(self) -> (Vec<PostSummary>, Option<Cursor>) {
        (self.accumulated, self.next_page)
    }
}

/// The seed's results followed by the summaries loaded after it.
///
/// Shared by the live [`Paginator`] and the listing states rebuilt from a
/// snapshot, so both show posts in the same order.
pub fn display_order<'a>(
    seed: &'a PostPage,
    accumulated: &'a [PostSummary],
) -> impl Iterator<Item = &'a PostSummary> {
    seed.results.iter().chain(accumulated)
}
