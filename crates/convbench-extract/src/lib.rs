//! Format-specific [`TextExtractor`] implementations.
//!
//! Each extractor understands one document family and feeds the
//! introspection side of fidelity validation. None of them attempt layout
//! reconstruction: they produce the plain text and the discrete unit
//! (page) count, nothing more.

pub mod html;
pub mod markdown;
pub mod plain;

pub use html::HtmlExtractor;
pub use markdown::MarkdownExtractor;
pub use plain::PlainTextExtractor;
// Re-export the trait and error so downstream crates need only this one.
pub use convbench_core::{ExtractError, TextExtractor};

/// Pick an extractor for a file extension.
///
/// Returns `None` for unrecognized extensions; the caller decides whether
/// that is an error or a fallback-to-plain situation.
pub fn for_extension(ext: &str) -> Option<Box<dyn TextExtractor>> {
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => Some(Box::new(PlainTextExtractor)),
        "md" | "markdown" => Some(Box::new(MarkdownExtractor)),
        "html" | "htm" | "xhtml" => Some(Box::new(HtmlExtractor::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_dispatch() {
        assert!(for_extension("txt").is_some());
        assert!(for_extension("MD").is_some());
        assert!(for_extension("Html").is_some());
        assert!(for_extension("docx").is_none());
        assert!(for_extension("").is_none());
    }
}
