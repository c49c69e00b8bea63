//! Review text cleanup

/// Trim a review and flatten line breaks to single spaces
///
/// Returns `None` for reviews that are blank after trimming.
pub fn normalize_review(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace("\r\n", " ").replace(['\n', '\r'], " "))
}

/// Drop every non-ASCII character
pub fn strip_non_ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}
