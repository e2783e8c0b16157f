//! Cover document parsing: encoding hint, initialization payload, book metadata.
//!
//! The cover page embeds its page list in a JavaScript call of the form
//! `_OC_Run({"page":[...],"prefix":"..."}, {"title":..., "attribution":...}, ...);`.
//! Parsing is split into small steps so that a missing payload, a payload in
//! the wrong encoding and a structurally invalid payload fail differently:
//!
//! 1. [`detect_encoding`] reads the declared charset from the `ie` input element
//! 2. [`locate_payload`] finds the raw argument bytes of the initialization call
//! 3. [`decode_payload`] decodes those bytes and parses them as a JSON array
//! 4. [`parse_cover`] turns the first two arguments into a [`BookInfo`]

use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;
use regex::bytes::Regex as BytesRegex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::ParseError;
use super::{compile_static_bytes_regex, compile_static_regex};

/// Encoding assumed when the cover declares none (ISO-8859-15).
#[must_use]
pub fn default_encoding() -> &'static Encoding {
    encoding_rs::ISO_8859_15
}

static IE_INPUT_RE: LazyLock<BytesRegex> =
    LazyLock::new(|| compile_static_bytes_regex(r#"(?i-u)^input\b[^>]*\sname="?ie\b"?"#));
static VALUE_ATTR_RE: LazyLock<BytesRegex> =
    LazyLock::new(|| compile_static_bytes_regex(r#"(?-u)value="([^"]*)""#));
static OC_RUN_RE: LazyLock<BytesRegex> =
    LazyLock::new(|| compile_static_bytes_regex(r"(?s-u)_OC_Run\((.*?)\);"));
static RAW_UNICODE_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"\\u([0-9a-fA-F]{4})|\\U([0-9a-fA-F]{8})")
});
static BY_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"^By\s+"));

/// Book metadata and page list recovered from the cover document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInfo {
    /// Book title.
    pub title: String,
    /// Author attribution with any leading "By " removed.
    pub attribution: String,
    /// URL prefix to which `&pg=<page id>` is appended to address a page.
    pub page_ordering_prefix: String,
    /// Page identifiers in reading order; never empty.
    pub page_ids: Vec<String>,
}

impl BookInfo {
    /// Builds the page document URL for `page_id`.
    #[must_use]
    pub fn page_url(&self, page_id: &str) -> String {
        format!("{}&pg={}", self.page_ordering_prefix, page_id)
    }
}

#[derive(Debug, Deserialize)]
struct PagesInfo {
    page: Vec<PageEntry>,
    prefix: String,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    pid: String,
    order: i64,
}

#[derive(Debug, Deserialize)]
struct BookMeta {
    title: String,
    #[serde(default)]
    attribution: String,
}

/// Returns the document encoding declared by the `ie` input element.
///
/// Falls back to [`default_encoding`] when no such element exists.
///
/// # Errors
///
/// Returns [`ParseError::MissingEncodingValue`] when the element has no
/// `value`, or [`ParseError::UnsupportedEncoding`] for an unknown label.
pub fn detect_encoding(html: &[u8]) -> Result<&'static Encoding, ParseError> {
    let Some(tag) = html
        .split(|&b| b == b'<')
        .find(|fragment| IE_INPUT_RE.is_match(fragment))
    else {
        return Ok(default_encoding());
    };

    let label = VALUE_ATTR_RE
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).to_lowercase())
        .ok_or(ParseError::MissingEncodingValue)?;

    Encoding::for_label(label.trim().as_bytes())
        .ok_or(ParseError::UnsupportedEncoding { label })
}

/// Returns the raw argument list of the first `_OC_Run(...)` call.
///
/// # Errors
///
/// Returns [`ParseError::MissingPayload`] when the call is absent.
pub fn locate_payload(html: &[u8]) -> Result<&[u8], ParseError> {
    OC_RUN_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_bytes())
        .ok_or(ParseError::MissingPayload)
}

/// Decodes a raw argument list with `encoding` and parses it as JSON values.
///
/// # Errors
///
/// Returns [`ParseError::Undecodable`] for byte sequences invalid in
/// `encoding` and [`ParseError::MalformedPayload`] for invalid JSON.
pub fn decode_payload(raw: &[u8], encoding: &'static Encoding) -> Result<Vec<Value>, ParseError> {
    let (text, had_errors) = encoding.decode_without_bom_handling(raw);
    if had_errors {
        return Err(ParseError::Undecodable {
            encoding: encoding.name(),
        });
    }
    serde_json::from_str(&format!("[{text}]")).map_err(|e| ParseError::MalformedPayload {
        reason: e.to_string(),
    })
}

/// Parses a cover document into [`BookInfo`].
///
/// # Errors
///
/// Returns [`ParseError`] when any step fails; see the module docs.
#[instrument(level = "debug", skip(html), fields(html_len = html.len()))]
pub fn parse_cover(html: &[u8]) -> Result<BookInfo, ParseError> {
    let encoding = detect_encoding(html)?;
    debug!(encoding = encoding.name(), "cover encoding");

    let raw = locate_payload(html)?;
    let mut args = decode_payload(raw, encoding)?;
    if args.len() < 2 {
        return Err(ParseError::MissingArguments { found: args.len() });
    }
    args.truncate(2);
    let book_value = args.pop().unwrap_or(Value::Null);
    let pages_value = args.pop().unwrap_or(Value::Null);

    let pages: PagesInfo =
        serde_json::from_value(pages_value).map_err(|e| ParseError::InvalidField {
            object: "pages info",
            reason: e.to_string(),
        })?;
    let meta: BookMeta =
        serde_json::from_value(book_value).map_err(|e| ParseError::InvalidField {
            object: "book info",
            reason: e.to_string(),
        })?;

    let mut entries = pages.page;
    entries.sort_by_key(|entry| entry.order);
    let page_ids: Vec<String> = entries.into_iter().map(|entry| entry.pid).collect();
    if page_ids.is_empty() {
        return Err(ParseError::NoPages);
    }

    let info = BookInfo {
        title: meta.title,
        attribution: BY_PREFIX_RE.replace(&meta.attribution, "").into_owned(),
        page_ordering_prefix: decode_raw_unicode_escapes(&pages.prefix),
        page_ids,
    };
    debug!(title = %info.title, pages = info.page_ids.len(), "parsed cover");
    Ok(info)
}

/// Replaces literal `\uXXXX` and `\UXXXXXXXX` sequences with their characters.
///
/// Sequences that do not name a valid scalar value are kept as written.
#[must_use]
pub fn decode_raw_unicode_escapes(value: &str) -> String {
    RAW_UNICODE_ESCAPE_RE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|hex| u32::from_str_radix(hex.as_str(), 16).ok())
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
