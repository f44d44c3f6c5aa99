//! HTML extraction via DOM parsing.
//!
//! Unit boundaries are explicit page containers (`div.page` /
//! `section.page` by default), the convention paginated HTML exports use.
//! Documents without any such container count as a single unit.

use scraper::{Html, Selector};

use convbench_core::{ExtractError, TextExtractor};

#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    page_selector: String,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self {
            page_selector: "div.page, section.page".to_string(),
        }
    }
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the CSS selector that marks unit boundaries.
    pub fn with_page_selector(mut self, selector: impl Into<String>) -> Self {
        self.page_selector = selector.into();
        self
    }
}

impl TextExtractor for HtmlExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let raw = std::str::from_utf8(bytes)?;
        let document = Html::parse_document(raw);
        let text: String = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");
        Ok(text)
    }

    fn unit_count(&self, bytes: &[u8]) -> Result<usize, ExtractError> {
        let raw = std::str::from_utf8(bytes)?;
        let document = Html::parse_document(raw);
        let selector = Selector::parse(&self.page_selector)
            .map_err(|e| ExtractError::Parse(format!("invalid page selector: {e}")))?;
        Ok(document.select(&selector).count().max(1))
    }
}
