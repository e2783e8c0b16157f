//! Parsing of user input and viewer documents.
//!
//! This module handles:
//! - Book identifier extraction from a bare id or a viewer URL
//! - Cover document parsing (encoding hint, embedded payload, metadata)
//! - Page image lookup in per-page documents
//!
//! All functions here are pure; fetching is done by [`crate::fetch`].

mod cover;
mod error;
mod page;
mod reference;

use regex::Regex;
use regex::bytes::Regex as BytesRegex;

pub use cover::{
    BookInfo, decode_payload, decode_raw_unicode_escapes, default_encoding, detect_encoding,
    locate_payload, parse_cover,
};
pub use error::{ParseError, ReferenceError};
pub use page::{RESTRICTED_PAGE_MARKER, locate_image};
pub use reference::{BookReference, resolve_reference};

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Byte-oriented variant of [`compile_static_regex`] for undecoded documents.
fn compile_static_bytes_regex(pattern: &str) -> BytesRegex {
    BytesRegex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}
