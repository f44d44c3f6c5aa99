//! Plain-text extraction.
//!
//! Unit boundaries are form feeds, the page-separator convention used by
//! text exports of paginated documents. A document with no form feeds is a
//! single unit.

use convbench_core::{ExtractError, TextExtractor};

const FORM_FEED: char = '\u{0C}';

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(text.replace(FORM_FEED, "\n"))
    }

    fn unit_count(&self, bytes: &[u8]) -> Result<usize, ExtractError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(text.matches(FORM_FEED).count() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_passes_through_with_page_breaks_softened() {
        let text = PlainTextExtractor
            .extract_text("page one\u{0C}page two".as_bytes())
            .unwrap();
        assert_eq!(text, "page one\npage two");
    }

    #[test]
    fn form_feeds_delimit_units() {
        let e = PlainTextExtractor;
        assert_eq!(e.unit_count(b"no breaks at all").unwrap(), 1);
        assert_eq!(e.unit_count("a\u{0C}b\u{0C}c".as_bytes()).unwrap(), 3);
        assert_eq!(e.unit_count(b"").unwrap(), 1);
    }

    #[test]
    fn invalid_utf8_is_an_extraction_error() {
        let err = PlainTextExtractor.extract_text(&[0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, ExtractError::Encoding(_)));
    }
}
