//! Helpers shared by the upstream API clients.

const ERROR_SNIPPET_BYTES: usize = 200;

/// Leading part of an error body, cut at a char boundary.
pub(crate) fn snippet(text: &str) -> &str {
    if text.len() > ERROR_SNIPPET_BYTES {
        &text[..text.floor_char_boundary(ERROR_SNIPPET_BYTES)]
    } else {
        text
    }
}
