//! Markdown extraction: strips syntax down to readable text.
//!
//! Thematic breaks (`---`, `***`, `___` on their own line) act as unit
//! separators, the convention page-aware Markdown exporters use.

use once_cell::sync::Lazy;
use regex::Regex;

use convbench_core::{ExtractError, TextExtractor};

static CODE_FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```.*$").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static THEMATIC_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ ]{0,3}(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());
static BLOCKQUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>\s?").unwrap());
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").unwrap());
static STAR_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,3}([^*\n]+)\*{1,3}").unwrap());
static UNDERSCORE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{1,3}([^_\n]+)_{1,3}").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let raw = std::str::from_utf8(bytes)?;

        // Order matters: breaks and fence delimiters are line-anchored and
        // must go before inline syntax rewrites the lines.
        let text = THEMATIC_BREAK.replace_all(raw, "");
        let text = CODE_FENCE_LINE.replace_all(&text, "");
        let text = IMAGE.replace_all(&text, "$1");
        let text = LINK.replace_all(&text, "$1");
        let text = HEADING_MARKER.replace_all(&text, "");
        let text = BLOCKQUOTE_MARKER.replace_all(&text, "");
        let text = LIST_MARKER.replace_all(&text, "");
        let text = STAR_EMPHASIS.replace_all(&text, "$1");
        let text = UNDERSCORE_EMPHASIS.replace_all(&text, "$1");
        let text = INLINE_CODE.replace_all(&text, "$1");

        Ok(text.into_owned())
    }

    fn unit_count(&self, bytes: &[u8]) -> Result<usize, ExtractError> {
        let raw = std::str::from_utf8(bytes)?;
        Ok(THEMATIC_BREAK.find_iter(raw).count() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_headings_links_and_emphasis() {
        let md = "# Title\n\nSome *emphasized* text with a [link](https://example.com).\n";
        let text = MarkdownExtractor.extract_text(md.as_bytes()).unwrap();
        assert_eq!(text, "Title\n\nSome emphasized text with a link.\n");
    }

    #[test]
    fn keeps_code_body_drops_fence_lines() {
        let md = "```rust\nlet x = 1;\n```\n";
        let text = MarkdownExtractor.extract_text(md.as_bytes()).unwrap();
        assert!(text.contains("let x = 1;"));
        assert!(!text.contains("```"));
        assert!(!text.contains("rust"));
    }

    #[test]
    fn image_alt_text_survives() {
        let md = "![figure one](fig1.png)";
        let text = MarkdownExtractor.extract_text(md.as_bytes()).unwrap();
        assert_eq!(text, "figure one");
    }

    #[test]
    fn list_and_quote_markers_are_removed() {
        let md = "- first\n- second\n> quoted\n1. numbered\n";
        let text = MarkdownExtractor.extract_text(md.as_bytes()).unwrap();
        assert_eq!(text, "first\nsecond\nquoted\nnumbered\n");
    }

    #[test]
    fn thematic_breaks_delimit_units() {
        let e = MarkdownExtractor;
        assert_eq!(e.unit_count(b"just one page").unwrap(), 1);
        assert_eq!(e.unit_count(b"page one\n\n---\n\npage two").unwrap(), 2);
        assert_eq!(e.unit_count(b"a\n***\nb\n___\nc").unwrap(), 3);
    }

    #[test]
    fn break_lines_are_not_text() {
        let text = MarkdownExtractor
            .extract_text(b"page one\n\n---\n\npage two")
            .unwrap();
        assert!(!text.contains("---"));
        assert!(text.contains("page one"));
        assert!(text.contains("page two"));
    }
}
