//! Post regeneration cache for incremental builds.
//!
//! Every post page may be regenerated once it is older than
//! `posts.revalidate_minutes` (30 by default). Between builds the pull stage
//! keeps each fetched [`PostDetail`] here together with the time it was
//! fetched; a post still inside its window is reused without a CMS request.
//!
//! # Entries
//!
//! Entries are keyed by uid and hold:
//!
//! - **`fetched_at`**: Unix seconds of the last successful fetch.
//! - **`content_hash`**: SHA-256 of the post's JSON form, used to tell an
//!   unchanged revalidation apart from an edited post in the build output.
//! - **`post`**: the detail itself.
//!
//! Posts that disappear from the CMS are pruned after each pull.
//!
//! ## Storage
//!
//! The cache is a JSON file at `<temp_dir>/.post-cache.json`. A missing,
//! corrupt, or older-version file loads as an empty cache.
//!
//! ## Bypassing the cache
//!
//! `--no-cache` on `pull` or `build` starts from an empty cache, so every post
//! is fetched. The file is rewritten afterwards as usual.

use crate::types::PostDetail;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the temp directory.
const CACHE_FILENAME: &str = ".post-cache.json";

/// Bump to invalidate existing caches when the format changes.
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct CacheEntry {
    pub fetched_at: i64,
    pub content_hash: String,
    pub post: PostDetail,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PostCache {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

/// How a post got into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidation {
    /// Reused from the cache; still inside its window.
    Fresh,
    /// Fetched for the first time.
    New,
    /// Refetched, identical to the cached copy.
    Unchanged,
    /// Refetched, different from the cached copy.
    Updated,
}

impl PostCache {
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the temp directory, falling back to an empty cache.
    pub fn load(dir: &Path) -> Self {
        let content = match std::fs::read_to_string(cache_path(dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(cache) if cache.version == CACHE_VERSION => cache,
            Ok(_) => Self::empty(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable post cache: {}", e);
                Self::empty()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(dir), json)
    }

    /// The cached post if it was fetched less than `max_age_secs` before `now`.
    pub fn fresh(&self, uid: &str, now: i64, max_age_secs: i64) -> Option<&PostDetail> {
        let entry = self.entries.get(uid)?;
        (now - entry.fetched_at < max_age_secs).then_some(&entry.post)
    }

    /// Store a freshly fetched post and report how it compares to the old entry.
    pub fn record(&mut self, post: PostDetail, now: i64) -> serde_json::Result<Revalidation> {
        let content_hash = hash_post(&post)?;
        let status = match self.entries.get(&post.uid) {
            None => Revalidation::New,
            Some(old) if old.content_hash == content_hash => Revalidation::Unchanged,
            Some(_) => Revalidation::Updated,
        };
        self.entries.insert(
            post.uid.clone(),
            CacheEntry {
                fetched_at: now,
                content_hash,
                post,
            },
        );
        Ok(status)
    }

    /// Drop every entry whose uid is not in `keep`.
    pub fn retain(&mut self, keep: &HashSet<&str>) {
        self.entries.retain(|uid, _| keep.contains(uid.as_str()));
    }
}

/// SHA-256 of a post's JSON serialization, as hex.
pub fn hash_post(post: &PostDetail) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(post)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILENAME)
}

/// Summary of cache behaviour for a pull.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub fresh: u32,
    pub new: u32,
    pub unchanged: u32,
    pub updated: u32,
}

impl CacheStats {
    pub fn count(&mut self, status: Revalidation) {
        match status {
            Revalidation::Fresh => self.fresh += 1,
            Revalidation::New => self.new += 1,
            Revalidation::Unchanged => self.unchanged += 1,
            Revalidation::Updated => self.updated += 1,
        }
    }

    pub fn fetched(&self) -> u32 {
        self.new + self.unchanged + self.updated
    }

    pub fn total(&self) -> u32 {
        self.fresh + self.fetched()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fresh == 0 && self.unchanged == 0 && self.updated == 0 {
            return write!(f, "{} fetched", self.new);
        }
        write!(
            f,
            "{} cached, {} fetched ({} new, {} unchanged, {} updated), {} total",
            self.fresh,
            self.fetched(),
            self.new,
            self.unchanged,
            self.updated,
            self.total()
        )
    }
}
