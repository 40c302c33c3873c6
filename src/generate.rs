//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Reads the snapshot written by the pull stage
//! and renders the final static site.
//!
//! ## Generated Pages
//!
//! - **Listing** (`/index.html`): the seed page of post summaries
//! - **Listing after loads** (`/page/{n}/index.html`): the listing as it reads
//!   after `n - 1` clicks on "Carregar mais posts"
//! - **Post pages** (`/post/{uid}/index.html`): banner, title, date, author,
//!   reading time and every content section
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Seed listing
//! ├── page/
//! │   ├── 2/index.html           # After one load
//! │   └── 3/index.html
//! ├── post/
//! │   ├── como-utilizar-hooks/index.html
//! │   └── criando-um-app-cra-do-zero/index.html
//! └── logo.svg                   # Copied from the assets directory
//! ```
//!
//! `page/` and `post/` are cleared before writing, so a post removed from the
//! CMS disappears from the site on the next build. Other files in the output
//! directory are left alone.
//!
//! ## Load More
//!
//! A listing page links to the next one only when its cursor is non-null and
//! the next state was pulled. The last page of a truncated listing therefore
//! has no link even though the CMS has more posts.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Post and summary fields are escaped; only rich text goes through
//! [`richtext::to_html`], which escapes text itself.

use crate::config::{self, SiteSection};
use crate::dates::format_publication_date;
use crate::pull::{ListingState, Snapshot};
use crate::reading_time::ReadingTime;
use crate::richtext;
use crate::types::{PostDetail, PostSummary};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

const LOAD_MORE_LABEL: &str = "Carregar mais posts";

/// What was written, for CLI output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateSummary {
    pub listing_pages: Vec<GeneratedListing>,
    pub posts: Vec<GeneratedPost>,
    /// Posts not written because their uid is not usable as a path segment.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedListing {
    pub path: String,
    pub post_count: usize,
    pub load_more: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPost {
    pub title: String,
    pub path: String,
    pub reading_time: ReadingTime,
}

/// Render the snapshot at `snapshot_path`.
///
/// `site.assets_dir` is resolved against `config_dir`, the directory holding
/// `config.toml`.
pub fn generate(
    snapshot_path: &Path,
    output_dir: &Path,
    config_dir: &Path,
) -> Result<GenerateSummary, GenerateError> {
    let snapshot_content = fs::read_to_string(snapshot_path)?;
    let snapshot: Snapshot = serde_json::from_str(&snapshot_content)?;
    let assets_dir = config_dir.join(&snapshot.config.site.assets_dir);
    generate_site(&snapshot, output_dir, Some(&assets_dir))
}

/// Render an already loaded snapshot into `output_dir`.
pub fn generate_site(
    snapshot: &Snapshot,
    output_dir: &Path,
    assets_dir: Option<&Path>,
) -> Result<GenerateSummary, GenerateError> {
    let site = &snapshot.config.site;
    let color_css = config::generate_color_css(&snapshot.config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;
    remove_previous_pages(output_dir)?;

    if let Some(assets) = assets_dir {
        if assets.is_dir() {
            copy_dir_recursive(assets, output_dir)?;
        } else {
            tracing::debug!(path = %assets.display(), "no assets directory");
        }
    }

    let mut summary = GenerateSummary::default();

    let listing = &snapshot.listing;
    let state_count = listing.state_count();
    for loads in 0..state_count {
        let Some(state) = listing.state(loads) else {
            break;
        };
        let number = loads + 1;
        let next_href = (state.next_page.is_some() && number < state_count)
            .then(|| listing_href(number + 1));

        let path = listing_path(number);
        let page_html = render_listing_page(&state, next_href.as_deref(), site, &css);
        write_page(output_dir, &path, page_html)?;

        summary.listing_pages.push(GeneratedListing {
            path,
            post_count: state.posts.len(),
            load_more: next_href.is_some(),
        });
    }

    for post in &snapshot.posts {
        if !is_safe_uid(&post.uid) {
            tracing::warn!(uid = %post.uid, "skipping post with unusable uid");
            summary.skipped.push(post.uid.clone());
            continue;
        }
        let path = format!("post/{}/index.html", post.uid);
        write_page(output_dir, &path, render_post_page(post, site, &css))?;

        summary.posts.push(GeneratedPost {
            title: post.title.clone(),
            path,
            reading_time: ReadingTime::estimate(&post.content),
        });
    }

    tracing::info!(output = %output_dir.display(), "site generated");
    Ok(summary)
}

/// Remove `page/` and `post/` left by an earlier build.
fn remove_previous_pages(output_dir: &Path) -> std::io::Result<()> {
    for dir in ["page", "post"] {
        let path = output_dir.join(dir);
        if path.is_dir() {
            tracing::debug!(path = %path.display(), "removing previous pages");
            fs::remove_dir_all(&path)?;
        }
    }
    Ok(())
}

fn write_page(output_dir: &Path, rel_path: &str, markup: Markup) -> std::io::Result<()> {
    let path = output_dir.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, markup.into_string())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Output path of listing page `number` (1-based).
fn listing_path(number: usize) -> String {
    match number {
        1 => "index.html".to_string(),
        n => format!("page/{}/index.html", n),
    }
}

fn listing_href(number: usize) -> String {
    match number {
        1 => "/".to_string(),
        n => format!("/page/{}/", n),
    }
}

fn post_href(uid: &str) -> String {
    format!("/post/{}/", uid)
}

/// A uid that can be used as a single directory name and URL segment.
fn is_safe_uid(uid: &str) -> bool {
    !uid.is_empty()
        && !uid.starts_with('.')
        && uid
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, lang: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Site header: the configured logo, or the site title as text.
fn site_header(site: &SiteSection) -> Markup {
    html! {
        header.site-header {
            div.content {
                a href="/" {
                    @if let Some(logo) = &site.logo {
                        img src=(logo) alt="logo";
                    } @else {
                        span.logo { (site.title) span { "." } }
                    }
                }
            }
        }
    }
}

/// Publication date, omitted when missing or unparseable.
fn publication_date(raw: Option<&str>) -> Markup {
    html! {
        @if let Some(date) = format_publication_date(raw) {
            time { (date) }
        }
    }
}

/// A listing card. Posts whose page is never written get no link.
fn post_card(post: &PostSummary) -> Markup {
    let body = html! {
        strong { (post.title) }
        p { (post.subtitle) }
        div.post-meta {
            (publication_date(post.first_publication_date.as_deref()))
            span.author { (post.author) }
        }
    };
    html! {
        @if is_safe_uid(&post.uid) {
            a.post-card href=(post_href(&post.uid)) { (body) }
        } @else {
            div.post-card { (body) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one listing state with an optional link to the next state.
fn render_listing_page(
    state: &ListingState<'_>,
    next_href: Option<&str>,
    site: &SiteSection,
    css: &str,
) -> Markup {
    let content = html! {
        (site_header(site))
        main.content.posts {
            @for post in &state.posts {
                (post_card(post))
            }
            @if let Some(href) = next_href {
                a.load-more href=(href) { (LOAD_MORE_LABEL) }
            }
        }
    };

    base_document(&site.title, &site.lang, css, content)
}

fn render_post_page(post: &PostDetail, site: &SiteSection, css: &str) -> Markup {
    let reading_time = ReadingTime::estimate(&post.content);

    let content = html! {
        (site_header(site))
        @if !post.banner_url.is_empty() {
            div.banner {
                img src=(post.banner_url) alt="banner";
            }
        }
        main.content.post {
            h1 { (post.title) }
            div.post-info {
                (publication_date(post.first_publication_date.as_deref()))
                span.author { (post.author) }
                span.reading-time { (reading_time.to_string()) }
            }
            article {
                @for section in &post.content {
                    section {
                        h2 { (section.heading) }
                        div.post-body {
                            (richtext::to_html(&section.body))
                        }
                    }
                }
            }
        }
    };

    let title = format!("{} | {}", post.title, site.title);
    base_document(&title, &site.lang, css, content)
}
