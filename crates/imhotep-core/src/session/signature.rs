//! Trailing clinician signature on stored prescription text.
//!
//! Stored text is the authored text followed by `"\n\n— " + author`. Stripping
//! cuts at the *last* `"\n\n—"`, so a prescription that itself contains that
//! sequence loses everything after its own occurrence when it is unsigned.

/// Separator between prescription text and the author name.
pub const SIGNATURE_MARKER: &str = "\n\n—";

/// Append the signature block. Applied even when `text` is empty.
///
/// The author name is written through [`signature_name`], so it can never
/// contain the marker itself.
pub fn append_signature(text: &str, author_name: &str) -> String {
    format!("{}{} {}", text, SIGNATURE_MARKER, signature_name(author_name))
}

/// Author name as it appears in a signature: whitespace runs, line breaks
/// included, collapsed to single spaces.
pub fn signature_name(author_name: &str) -> String {
    author_name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove the last signature block and trailing whitespace before it.
///
/// Text without the marker is returned unchanged.
pub fn strip_signature(stored_text: &str) -> &str {
    match stored_text.rfind(SIGNATURE_MARKER) {
        Some(idx) => stored_text[..idx].trim_end(),
        None => stored_text,
    }
}
