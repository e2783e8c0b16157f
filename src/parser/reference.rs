//! Book identifier extraction from free-form input.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::compile_static_regex;
use super::error::ReferenceError;

/// `id` query parameter: key at the start of the query or after a separator.
static ID_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?i)(?:^|[?&])id=([^&]+)"));

/// Characters that mark the input as a URL rather than a bare identifier.
const DELIMITERS: &[char] = &['/', '?', '&'];

/// A canonical book identifier, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookReference(String);

impl BookReference {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves a bare book id or a viewer URL to a [`BookReference`].
///
/// Input without `/`, `?` or `&` is taken verbatim. Otherwise the
/// percent-decoded value of the `id` query parameter is returned; any
/// `#fragment` is ignored.
///
/// # Errors
///
/// Returns [`ReferenceError::Malformed`] when the input is empty or is URL-like
/// without an `id` parameter.
///
/// # Examples
///
/// ```
/// use pagegrab_core::parser::resolve_reference;
///
/// let bare = resolve_reference("abcDEF123").unwrap();
/// assert_eq!(bare.as_str(), "abcDEF123");
///
/// let url = resolve_reference("https://books.google.com/books?hl=en&id=abcDEF123&pg=PA1").unwrap();
/// assert_eq!(url.as_str(), "abcDEF123");
/// ```
pub fn resolve_reference(input: &str) -> Result<BookReference, ReferenceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReferenceError::malformed(input));
    }

    if !trimmed.contains(DELIMITERS) {
        return Ok(BookReference(trimmed.to_string()));
    }

    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let id = ID_PARAM_RE
        .captures(without_fragment)
        .and_then(|caps| caps.get(1))
        .and_then(|m| urlencoding::decode(m.as_str()).ok())
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(|| ReferenceError::malformed(input))?;

    debug!(id = %id, "extracted book id from URL");
    Ok(BookReference(id))
}
