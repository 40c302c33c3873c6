//! # spacetraveling
//!
//! A static blog front-end for a Prismic repository. Posts live in the CMS;
//! this crate pulls them, paginates the listing the way a reader would with
//! "Carregar mais posts", estimates reading time, and writes plain HTML.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Pull      CMS       →  snapshot.json   (listing states + post details)
//! 2. Generate  snapshot  →  dist/           (final HTML site)
//! ```
//!
//! The snapshot is human-readable JSON, so a broken page can be traced to the
//! data that produced it, and `generate` can be rerun without touching the
//! network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pull`] | Stage 1: drives the CMS and the paginator, writes the snapshot |
//! | [`generate`] | Stage 2: renders listing pages and post pages using Maud |
//! | [`cms`] | `ContentApi` trait and the Prismic REST client behind it |
//! | [`paginator`] | Incremental "load more" pagination over listing pages |
//! | [`reading_time`] | Words-per-minute reading estimate for a post |
//! | [`richtext`] | Rich text blocks to plain text and to HTML |
//! | [`dates`] | `dd mmm yyyy` publication dates with Portuguese months |
//! | [`cache`] | Post regeneration cache keyed by uid |
//! | [`config`] | `config.toml` loading, environment overrides, validation, CSS colors |
//! | [`types`] | Posts, pages and rich text as carried between stages |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## Static "Load More"
//!
//! A listing page cannot fetch anything once it is deployed, so the pull stage
//! walks the paginator ahead of time and records each load. The generate stage
//! writes one listing page per recorded state; the "load more" button is a
//! link to the next one.
//!
//! ## Narrow CMS Seam
//!
//! Everything that talks to Prismic sits behind [`cms::ContentApi`], four
//! async methods. Pagination and the pull stage are tested against in-memory
//! fakes; only [`cms::PrismicClient`] knows the wire format.
//!
//! ## Timed Regeneration
//!
//! Post pages are regenerated at most once per `posts.revalidate_minutes`.
//! Between builds, the [`cache`] keeps each post with the time it was
//! fetched, so a rebuild inside the window does not hit the CMS for it.

pub mod cache;
pub mod cms;
pub mod config;
pub mod dates;
pub mod generate;
pub mod output;
pub mod paginator;
pub mod pull;
pub mod reading_time;
pub mod richtext;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
