//! Page image lookup in per-page viewer documents.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::compile_static_regex;
use super::error::ParseError;

/// Fragment served in place of the image for pages outside the free preview.
pub const RESTRICTED_PAGE_MARKER: &str = "/googlebooks/restricted_logo.gif";

static BACKGROUND_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"background-image:url\("([^"]+)"\)"#));

/// Returns the image URL of a page document.
///
/// `Ok(None)` means the page is restricted and should be skipped.
///
/// # Errors
///
/// Returns [`ParseError::NoImage`] when the document has neither the
/// restricted-page marker nor an inline background image.
///
/// # Examples
///
/// ```
/// use pagegrab_core::parser::locate_image;
///
/// let html = r#"<div style='background-image:url("https://img.example/p1.png")'></div>"#;
/// assert_eq!(locate_image(html).unwrap().as_deref(), Some("https://img.example/p1.png"));
/// ```
pub fn locate_image(html: &str) -> Result<Option<String>, ParseError> {
    if html.contains(RESTRICTED_PAGE_MARKER) {
        return Ok(None);
    }

    match BACKGROUND_IMAGE_RE.captures(html).and_then(|caps| caps.get(1)) {
        Some(url) => Ok(Some(url.as_str().to_string())),
        None => {
            trace!(html = %html, "page document without image or placeholder");
            Err(ParseError::NoImage)
        }
    }
}
