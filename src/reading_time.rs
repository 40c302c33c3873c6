//! Reading-time estimate for a post.
//!
//! Words are counted in every section heading and in the plain-text form of
//! every section body, then divided by a fixed reading speed and rounded up:
//!
//! ```text
//! minutes = ceil(total_words / 200)
//! ```
//!
//! A word is a maximal run of non-whitespace characters, so empty and
//! whitespace-only text contributes nothing. Formatting is irrelevant: only
//! [`to_plain_text`](crate::richtext::to_plain_text) output is counted.

use crate::richtext::to_plain_text;
use crate::types::ContentSection;
use std::fmt;

pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    pub total_words: usize,
    pub minutes: usize,
}

impl ReadingTime {
    pub fn estimate(content: &[ContentSection]) -> Self {
        let total_words = total_words(content);
        Self {
            total_words,
            minutes: total_words.div_ceil(WORDS_PER_MINUTE),
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes)
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn total_words(content: &[ContentSection]) -> usize {
    content
        .iter()
        .map(|section| count_words(&section.heading) + count_words(&to_plain_text(&section.body)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RichTextBlock;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn section(heading: &str, body: &[&str]) -> ContentSection {
        ContentSection {
            heading: heading.to_string(),
            body: body.iter().map(|t| RichTextBlock::paragraph(*t)).collect(),
        }
    }

    #[test]
    fn empty_content_is_zero_minutes() {
        let estimate = ReadingTime::estimate(&[]);
        assert_eq!(estimate.total_words, 0);
        assert_eq!(estimate.minutes, 0);
        assert_eq!(estimate.to_string(), "0 min");
    }

    #[test]
    fn exactly_two_hundred_words_is_one_minute() {
        let body = words(199);
        let estimate = ReadingTime::estimate(&[section("Intro", &[&body])]);
        assert_eq!(estimate.total_words, 200);
        assert_eq!(estimate.minutes, 1);
    }

    #[test]
    fn two_hundred_and_one_words_rounds_up() {
        let body = words(200);
        let estimate = ReadingTime::estimate(&[section("Intro", &[&body])]);
        assert_eq!(estimate.total_words, 201);
        assert_eq!(estimate.minutes, 2);
        assert_eq!(estimate.to_string(), "2 min");
    }

    #[test]
    fn whitespace_only_text_counts_nothing() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \t\n "), 0);
        let estimate = ReadingTime::estimate(&[section("  ", &["", " \n "])]);
        assert_eq!(estimate.total_words, 0);
    }

    #[test]
    fn whitespace_runs_are_one_separator() {
        assert_eq!(count_words("  one\t\ttwo \n three  "), 3);
    }

    #[test]
    fn words_are_summed_across_sections_and_blocks() {
        let content = vec![
            section("First part", &["a b c", "d e"]),
            section("Second", &["f"]),
        ];
        assert_eq!(total_words(&content), 2 + 5 + 1 + 1);
    }

    #[test]
    fn block_boundaries_separate_words() {
        // "end" and "start" must not merge into one word
        let content = vec![section("", &["the end", "start again"])];
        assert_eq!(total_words(&content), 4);
    }

    #[test]
    fn formatting_does_not_change_the_count() {
        let mut block = RichTextBlock::paragraph("bold and plain");
        block.spans = vec![crate::types::Span {
            start: 0,
            end: 4,
            kind: "strong".to_string(),
            data: None,
        }];
        let content = vec![ContentSection {
            heading: String::new(),
            body: vec![block],
        }];
        assert_eq!(total_words(&content), 3);
    }
}
