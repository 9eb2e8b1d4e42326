//! Slug derivation used when a record or node carries no explicit slug

/// Lowercase, ASCII alphanumerics separated by single dashes
///
/// `"Jane A. Doe"` becomes `"jane-a-doe"`. Returns an empty string when the
/// input has no usable characters.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
