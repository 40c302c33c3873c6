//! Rich text conversion.
//!
//! Post bodies arrive as a list of typed blocks with inline spans. This
//! module is the only place that knows the block vocabulary:
//!
//! - [`to_plain_text`] flattens blocks for word counting.
//! - [`to_html`] renders blocks for the reading view.
//!
//! | Block type | HTML |
//! |---|---|
//! | `heading1`..`heading6` | `<h1>`..`<h6>` |
//! | `paragraph` | `<p>` |
//! | `preformatted` | `<pre>` (spans ignored) |
//! | `list-item` / `o-list-item` | consecutive items grouped in `<ul>` / `<ol>` |
//! | `image` | `<img>` |
//! | `embed` | dropped |
//! | anything else | `<p>` |
//!
//! Spans may overlap. Text is cut at every span boundary and each segment is
//! wrapped in the tags of all spans covering it.

use crate::types::{RichTextBlock, Span};
use maud::{Markup, html};

/// Concatenate the text of every block, separated by a single space.
pub fn to_plain_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

enum Group<'a> {
    Single(&'a RichTextBlock),
    List {
        ordered: bool,
        items: Vec<&'a RichTextBlock>,
    },
}

fn list_kind(block: &RichTextBlock) -> Option<bool> {
    match block.kind.as_str() {
        "list-item" => Some(false),
        "o-list-item" => Some(true),
        _ => None,
    }
}

fn group_blocks(blocks: &[RichTextBlock]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for block in blocks {
        let Some(ordered) = list_kind(block) else {
            groups.push(Group::Single(block));
            continue;
        };
        if let Some(Group::List { ordered: o, items }) = groups.last_mut()
            && *o == ordered
        {
            items.push(block);
            continue;
        }
        groups.push(Group::List {
            ordered,
            items: vec![block],
        });
    }
    groups
}

/// Render blocks as HTML. All text is escaped.
pub fn to_html(blocks: &[RichTextBlock]) -> Markup {
    html! {
        @for group in group_blocks(blocks) {
            @match group {
                Group::Single(block) => { (render_block(block)) }
                Group::List { ordered: true, items } => {
                    ol { @for item in items { li { (render_inline(&item.text, &item.spans)) } } }
                }
                Group::List { ordered: false, items } => {
                    ul { @for item in items { li { (render_inline(&item.text, &item.spans)) } } }
                }
            }
        }
    }
}

fn render_block(block: &RichTextBlock) -> Markup {
    let inline = render_inline(&block.text, &block.spans);
    match block.kind.as_str() {
        "heading1" => html! { h1 { (inline) } },
        "heading2" => html! { h2 { (inline) } },
        "heading3" => html! { h3 { (inline) } },
        "heading4" => html! { h4 { (inline) } },
        "heading5" => html! { h5 { (inline) } },
        "heading6" => html! { h6 { (inline) } },
        "preformatted" => html! { pre { (block.text) } },
        "image" => match &block.url {
            Some(url) => html! {
                img src=(url) alt=(block.alt.as_deref().unwrap_or("")) loading="lazy";
            },
            None => html! {},
        },
        "embed" => html! {},
        _ => html! { p { (inline) } },
    }
}

/// Render text with its inline spans. Offsets are UTF-16 code units, as the
/// Prismic editor counts them, and are clamped to the text length.
fn render_inline(text: &str, spans: &[Span]) -> Markup {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut units: Vec<usize> = Vec::with_capacity(len + 1);
    units.push(0);
    for c in &chars {
        units.push(units[units.len() - 1] + c.len_utf16());
    }
    // An offset inside a surrogate pair moves to the end of that character
    let to_char = |unit: usize| units.partition_point(|&u| u < unit).min(len);

    let ranges: Vec<(usize, usize, &Span)> = spans
        .iter()
        .map(|s| (to_char(s.start), to_char(s.end), s))
        .collect();

    let mut bounds = vec![0, len];
    for (start, end, _) in &ranges {
        bounds.push(*start);
        bounds.push(*end);
    }
    bounds.sort_unstable();
    bounds.dedup();

    html! {
        @for window in bounds.windows(2) {
            @let (from, to) = (window[0], window[1]);
            @let segment: String = chars[from..to].iter().collect();
            @let active: Vec<&Span> = ranges
                .iter()
                .filter(|(start, end, _)| *start <= from && to <= *end)
                .map(|(_, _, span)| *span)
                .collect();
            (wrap(&segment, &active))
        }
    }
}

fn wrap(segment: &str, spans: &[&Span]) -> Markup {
    let Some((span, rest)) = spans.split_first() else {
        return html! {
            @for (i, line) in segment.split('\n').enumerate() {
                @if i > 0 { br; }
                (line)
            }
        };
    };
    let inner = wrap(segment, rest);
    match span.kind.as_str() {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        "hyperlink" => match span.data.as_ref().and_then(|d| d.url.as_deref()) {
            Some(url) => html! { a href=(url) { (inner) } },
            None => inner,
        },
        _ => inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpanData;

    fn span(start: usize, end: usize, kind: &str) -> Span {
        Span {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    #[test]
    fn plain_text_joins_blocks_with_space() {
        let blocks = vec![
            RichTextBlock::paragraph("one two"),
            RichTextBlock::new("heading2", "three"),
        ];
        assert_eq!(to_plain_text(&blocks), "one two three");
    }

    #[test]
    fn plain_text_of_nothing_is_empty() {
        assert_eq!(to_plain_text(&[]), "");
    }

    #[test]
    fn paragraph_and_headings() {
        let blocks = vec![
            RichTextBlock::new("heading3", "Title"),
            RichTextBlock::paragraph("Body"),
        ];
        let html = to_html(&blocks).into_string();
        assert_eq!(html, "<h3>Title</h3><p>Body</p>");
    }

    #[test]
    fn consecutive_list_items_share_a_list() {
        let blocks = vec![
            RichTextBlock::new("list-item", "a"),
            RichTextBlock::new("list-item", "b"),
            RichTextBlock::new("o-list-item", "c"),
            RichTextBlock::paragraph("d"),
            RichTextBlock::new("list-item", "e"),
        ];
        let html = to_html(&blocks).into_string();
        assert_eq!(
            html,
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p><ul><li>e</li></ul>"
        );
    }

    #[test]
    fn spans_wrap_their_ranges() {
        let mut block = RichTextBlock::paragraph("plain bold italic");
        block.spans = vec![span(6, 10, "strong"), span(11, 17, "em")];
        let html = to_html(&[block]).into_string();
        assert_eq!(
            html,
            "<p>plain <strong>bold</strong> <em>italic</em></p>"
        );
    }

    #[test]
    fn overlapping_spans_nest_per_segment() {
        let mut block = RichTextBlock::paragraph("abc");
        block.spans = vec![span(0, 2, "strong"), span(1, 3, "em")];
        let html = to_html(&[block]).into_string();
        assert_eq!(
            html,
            "<p><strong>a</strong><strong><em>b</em></strong><em>c</em></p>"
        );
    }

    #[test]
    fn hyperlink_span_uses_url() {
        let mut block = RichTextBlock::paragraph("see docs");
        block.spans = vec![Span {
            start: 4,
            end: 8,
            kind: "hyperlink".to_string(),
            data: Some(SpanData {
                url: Some("https://prismic.io/docs".to_string()),
            }),
        }];
        let html = to_html(&[block]).into_string();
        assert!(html.contains(r#"<a href="https://prismic.io/docs">docs</a>"#));
    }

    #[test]
    fn span_offsets_count_utf16_units_not_bytes() {
        let mut block = RichTextBlock::paragraph("ação rápida");
        block.spans = vec![span(5, 11, "strong")];
        let html = to_html(&[block]).into_string();
        assert_eq!(html, "<p>ação <strong>rápida</strong></p>");
    }

    #[test]
    fn astral_characters_take_two_offset_units() {
        // 🚀 is one char but two UTF-16 units
        let mut block = RichTextBlock::paragraph("🚀 ação rápida");
        block.spans = vec![span(8, 14, "strong")];
        let html = to_html(&[block]).into_string();
        assert_eq!(html, "<p>🚀 ação <strong>rápida</strong></p>");
    }

    #[test]
    fn offset_inside_surrogate_pair_keeps_the_character_whole() {
        let mut block = RichTextBlock::paragraph("a🚀b");
        block.spans = vec![span(2, 4, "em")];
        let html = to_html(&[block]).into_string();
        assert_eq!(html, "<p>a🚀<em>b</em></p>");
    }

    #[test]
    fn out_of_range_span_is_clamped() {
        let mut block = RichTextBlock::paragraph("short");
        block.spans = vec![span(2, 99, "em")];
        let html = to_html(&[block]).into_string();
        assert_eq!(html, "<p>sh<em>ort</em></p>");
    }

    #[test]
    fn newlines_become_line_breaks() {
        let html = to_html(&[RichTextBlock::paragraph("one\ntwo")]).into_string();
        assert_eq!(html, "<p>one<br>two</p>");
    }

    #[test]
    fn text_is_escaped() {
        let html = to_html(&[RichTextBlock::paragraph("<script>x</script>")]).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn image_block_renders_img_and_embed_is_dropped() {
        let mut image = RichTextBlock::new("image", "");
        image.url = Some("https://images.prismic.io/a.png".to_string());
        image.alt = Some("diagram".to_string());
        let embed = RichTextBlock::new("embed", "");
        let html = to_html(&[image, embed]).into_string();
        assert_eq!(
            html,
            r#"<img src="https://images.prismic.io/a.png" alt="diagram" loading="lazy">"#
        );
    }

    #[test]
    fn unknown_block_falls_back_to_paragraph() {
        let html = to_html(&[RichTextBlock::new("label", "x")]).into_string();
        assert_eq!(html, "<p>x</p>");
    }
}
