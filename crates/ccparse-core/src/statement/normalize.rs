//! Text normalization applied once before any matching.

use super::patterns::WHITESPACE_RUN;

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Line and page breaks are whitespace too, so the result does not depend
/// on how the source split the document.
pub fn normalize_text(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw, " ").trim().to_string()
}
