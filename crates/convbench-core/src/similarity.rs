//! Normalized text similarity over edit distance.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize text for comparison: collapse runs of whitespace (spaces,
/// tabs, newlines) to a single space, trim, lowercase.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RUNS
        .replace_all(text, " ")
        .trim()
        .to_lowercase()
}

/// Text similarity in `[0, 1]`.
///
/// Both inputs are normalized first. Identical normalized strings (the
/// empty/empty pair included) score 1.0; otherwise the score is
/// `1 - levenshtein / max(len_a, len_b)` over Unicode scalar values.
/// The underlying Levenshtein distance is exact, so equal inputs always
/// reproduce equal scores. Cost is O(len_a · len_b); callers comparing
/// very large documents should bound input size.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    if a == b {
        return 1.0;
    }
    rapidfuzz::distance::levenshtein::normalized_similarity(a.chars(), b.chars())
}
