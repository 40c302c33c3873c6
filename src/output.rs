//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output lists content, not files. Every post leads with its positional
//! index and title; uids, cache status and output paths follow as secondary
//! context, either indented or after an arrow.
//!
//! # Output Format
//!
//! ## Pull
//!
//! ```text
//! Page 1
//!     Como utilizar Hooks
//! Page 2
//!     Criando um app CRA do zero
//!
//! Posts
//! 001 Como utilizar Hooks
//!     como-utilizar-hooks: cached
//! 002 Criando um app CRA do zero
//!     criando-um-app-cra-do-zero: updated
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html (1 post, load more)
//! Page 2 → page/2/index.html (2 posts)
//!
//! Posts
//! 001 Como utilizar Hooks → post/como-utilizar-hooks/index.html (4 min)
//!
//! Generated 2 listing pages, 1 post
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::cache::Revalidation;
use crate::config::SiteConfig;
use crate::generate::GenerateSummary;
use crate::pull::PullEvent;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title.
///
/// ```text
/// 001 Como utilizar Hooks
/// ```
fn entity_header(index: usize, title: &str) -> String {
    format!("{} {}", format_index(index), title)
}

fn plural(count: usize, noun: &str) -> String {
    match count {
        1 => format!("1 {}", noun),
        n => format!("{} {}s", n, noun),
    }
}

fn status_label(status: Revalidation) -> &'static str {
    match status {
        Revalidation::Fresh => "cached",
        Revalidation::New => "new",
        Revalidation::Unchanged => "unchanged",
        Revalidation::Updated => "updated",
    }
}

// ============================================================================
// Stage 1: Pull output
// ============================================================================

/// Format a single pull progress event as display lines.
pub fn format_pull_event(event: &PullEvent) -> Vec<String> {
    match event {
        PullEvent::ListingPage { number, titles, .. } => {
            let mut lines = vec![format!("Page {}", number)];
            lines.extend(titles.iter().map(|t| format!("{}{}", indent(1), t)));
            lines
        }
        PullEvent::ListingTruncated { max_pages } => vec![format!(
            "Listing stopped after {} loaded pages (listing.max_pages), older posts are not listed",
            max_pages
        )],
        PullEvent::PostPulled {
            index,
            uid,
            title,
            status,
        } => {
            let mut lines = Vec::new();
            if *index == 1 {
                lines.push(String::new());
                lines.push("Posts".to_string());
            }
            lines.push(entity_header(*index, title));
            lines.push(format!("{}{}: {}", indent(1), uid, status_label(*status)));
            lines
        }
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing the written pages.
pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (idx, page) in summary.listing_pages.iter().enumerate() {
        let name = match idx {
            0 => "Home".to_string(),
            n => format!("Page {}", n + 1),
        };
        let more = if page.load_more { ", load more" } else { "" };
        lines.push(format!(
            "{} \u{2192} {} ({}{})",
            name,
            page.path,
            plural(page.post_count, "post"),
            more
        ));
    }

    if !summary.posts.is_empty() {
        lines.push(String::new());
        lines.push("Posts".to_string());
        for (idx, post) in summary.posts.iter().enumerate() {
            lines.push(format!(
                "{} \u{2192} {} ({})",
                entity_header(idx + 1, &post.title),
                post.path,
                post.reading_time
            ));
        }
    }

    if !summary.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (uid not usable as a path)".to_string());
        for uid in &summary.skipped {
            lines.push(format!("{}{}", indent(1), uid));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        plural(summary.listing_pages.len(), "listing page"),
        plural(summary.posts.len(), "post")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the result of resolving the repository's master ref.
pub fn format_check_output(config: &SiteConfig, master_ref: &str) -> Vec<String> {
    let token = if config.cms.access_token.is_some() {
        "set"
    } else {
        "not set"
    };
    vec![
        format!("Endpoint: {}", config.cms.endpoint),
        format!("{}Master ref: {}", indent(1), master_ref),
        format!("{}Access token: {}", indent(1), token),
        format!(
            "{}Listing: {} documents, {} per page, up to {} extra pages",
            indent(1),
            config.cms.document_type,
            config.cms.page_size,
            config.listing.max_pages
        ),
    ]
}

pub fn print_check_output(config: &SiteConfig, master_ref: &str) {
    for line in format_check_output(config, master_ref) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedListing, GeneratedPost};
    use crate::reading_time::ReadingTime;
    use crate::test_helpers::test_config;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn listing_page_event() {
        let lines = format_pull_event(&PullEvent::ListingPage {
            number: 2,
            titles: vec!["Como utilizar Hooks".into(), "Outro post".into()],
            more: true,
        });
        assert_eq!(
            lines,
            vec!["Page 2", "    Como utilizar Hooks", "    Outro post"]
        );
    }

    #[test]
    fn first_post_event_opens_posts_section() {
        let lines = format_pull_event(&PullEvent::PostPulled {
            index: 1,
            uid: "como-utilizar-hooks".into(),
            title: "Como utilizar Hooks".into(),
            status: Revalidation::Fresh,
        });
        assert_eq!(
            lines,
            vec![
                "",
                "Posts",
                "001 Como utilizar Hooks",
                "    como-utilizar-hooks: cached"
            ]
        );
    }

    #[test]
    fn later_post_event_has_no_section_header() {
        let lines = format_pull_event(&PullEvent::PostPulled {
            index: 2,
            uid: "b".into(),
            title: "B".into(),
            status: Revalidation::Updated,
        });
        assert_eq!(lines, vec!["002 B", "    b: updated"]);
    }

    #[test]
    fn truncation_event_names_the_setting() {
        let lines = format_pull_event(&PullEvent::ListingTruncated { max_pages: 50 });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("50"));
        assert!(lines[0].contains("listing.max_pages"));
    }

    #[test]
    fn generate_output_lists_pages_and_posts() {
        let summary = GenerateSummary {
            listing_pages: vec![
                GeneratedListing {
                    path: "index.html".into(),
                    post_count: 1,
                    load_more: true,
                },
                GeneratedListing {
                    path: "page/2/index.html".into(),
                    post_count: 2,
                    load_more: false,
                },
            ],
            posts: vec![GeneratedPost {
                title: "Como utilizar Hooks".into(),
                path: "post/como-utilizar-hooks/index.html".into(),
                reading_time: ReadingTime {
                    total_words: 700,
                    minutes: 4,
                },
            }],
            skipped: vec![],
        };

        let lines = format_generate_output(&summary);
        assert_eq!(
            lines,
            vec![
                "Home \u{2192} index.html (1 post, load more)",
                "Page 2 \u{2192} page/2/index.html (2 posts)",
                "",
                "Posts",
                "001 Como utilizar Hooks \u{2192} post/como-utilizar-hooks/index.html (4 min)",
                "",
                "Generated 2 listing pages, 1 post",
            ]
        );
    }

    #[test]
    fn generate_output_lists_skipped_uids() {
        let summary = GenerateSummary {
            listing_pages: vec![],
            posts: vec![],
            skipped: vec!["a/b".into()],
        };
        let lines = format_generate_output(&summary);
        assert!(lines.contains(&"    a/b".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Generated 0 listing pages, 0 posts")
        );
    }

    #[test]
    fn check_output_hides_token_value() {
        let mut config = test_config();
        config.cms.access_token = Some("secret".into());
        let lines = format_check_output(&config, "YBxyz");
        assert_eq!(lines[0], "Endpoint: https://blog.cdn.prismic.io/api/v2");
        assert_eq!(lines[1], "    Master ref: YBxyz");
        assert_eq!(lines[2], "    Access token: set");
        assert!(!lines.iter().any(|l| l.contains("secret")));
    }
}
