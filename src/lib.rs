//! Pagegrab Core Library
//!
//! This library retrieves the viewable pages of a preview-restricted book
//! viewer and hands them to the caller one page at a time, ready to be saved
//! and assembled into a single document.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Identifier resolution, cover payload parsing, page image lookup
//! - [`fetch`] - Session-scoped HTTP fetching with a browser identity
//! - [`retrieve`] - Lazy, page-ordered retrieval driver
//! - [`output`] - On-disk layout for saved page images
//! - [`assemble`] - Document assembly through an external tool

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assemble;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod retrieve;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use assemble::{AssembleError, DocumentAssembler, Img2PdfAssembler};
pub use fetch::{FetchError, FetchSettings, HttpFetcher, Session};
pub use output::{BookDirectory, DEFAULT_OUTPUT_ROOT, OutputError};
pub use parser::{
    BookInfo, BookReference, ParseError, ReferenceError, locate_image, parse_cover,
    resolve_reference,
};
pub use retrieve::{
    BookRetriever, DEFAULT_BASE_URL, ErrorKind, PageRange, PageSequence, PageUnit, RetrieveError,
};
