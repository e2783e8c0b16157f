//! Page-ordered retrieval of a book's viewable pages.
//!
//! [`BookRetriever::open`] resolves the identifier and loads the cover once;
//! the returned [`PageSequence`] then fetches one page per call to
//! [`PageSequence::next_page`]. Nothing is prefetched: network activity
//! happens only while the caller pulls.
//!
//! # Example
//!
//! ```no_run
//! use pagegrab_core::fetch::FetchSettings;
//! use pagegrab_core::retrieve::{BookRetriever, PageRange};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retriever = BookRetriever::new(FetchSettings::default())?;
//! let mut pages = retriever.open("abcDEF123", PageRange::all()).await?;
//! while let Some(unit) = pages.next_page().await? {
//!     println!("{} page {}: {} bytes", unit.book.title, unit.page_number, unit.image.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;

use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;
use tracing::{debug, info, instrument};
use url::Url;

use crate::fetch::{FetchSettings, HttpFetcher, Session};
use crate::parser::{BookInfo, BookReference, locate_image, parse_cover, resolve_reference};

pub use error::{ErrorKind, RetrieveError};

/// Default viewer host.
pub const DEFAULT_BASE_URL: &str = "https://books.google.com";

/// Half-open page index range `[start, end)`; `end = None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRange {
    /// First page index to retrieve.
    pub start: usize,
    /// Index one past the last page to retrieve.
    pub end: Option<usize>,
}

impl PageRange {
    /// Creates a range from `start` up to (excluding) `end`.
    #[must_use]
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// The full page list.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Clamps the range to a book of `len` pages.
    #[must_use]
    pub fn bounded(self, len: usize) -> Range<usize> {
        let end = self.end.map_or(len, |end| end.min(len));
        self.start.min(end)..end
    }
}

/// One retrieved page.
#[derive(Debug, Clone)]
pub struct PageUnit {
    /// Metadata of the book the page belongs to.
    pub book: Arc<BookInfo>,
    /// Zero-based index in the book's full page list (not a yield count).
    pub page_number: usize,
    /// Raw image payload as served by the viewer.
    pub image: Bytes,
}

/// Entry point for retrieving one book.
///
/// Each retriever owns its own [`Session`]; [`open`](Self::open) consumes it
/// so a session can never be reused for a second book.
#[derive(Debug)]
pub struct BookRetriever {
    fetcher: HttpFetcher,
    base_url: Url,
}

impl BookRetriever {
    /// Creates a retriever against [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError`] if the HTTP client cannot be built.
    pub fn new(settings: FetchSettings) -> Result<Self, RetrieveError> {
        Self::with_base_url(settings, DEFAULT_BASE_URL)
    }

    /// Creates a retriever against a custom viewer host (used by integration tests).
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute URL, or a network-kind error if the client cannot be built.
    pub fn with_base_url(settings: FetchSettings, base_url: &str) -> Result<Self, RetrieveError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| RetrieveError::InvalidBaseUrl {
                url: base_url.to_string(),
            })?;
        let fetcher = HttpFetcher::new(Session::new(), settings)?;
        Ok(Self { fetcher, base_url })
    }

    /// Builds the cover document URL for `reference`.
    #[must_use]
    pub fn cover_url(&self, reference: &BookReference) -> String {
        let mut url = self.base_url.clone();
        let path = format!("{}/books", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("id", reference.as_str())
            .append_pair("hl", "en")
            .append_pair("printsec", "frontcover");
        url.into()
    }

    /// Resolves `input`, loads the cover, and returns the lazy page sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError`] if the input is malformed, the cover cannot
    /// be fetched, or the cover cannot be parsed. No page is fetched in that
    /// case.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn open(self, input: &str, range: PageRange) -> Result<PageSequence, RetrieveError> {
        let reference = resolve_reference(input)?;
        let cover_url = self.cover_url(&reference);
        debug!(id = %reference, url = %cover_url, "loading cover");

        let cover = self.fetcher.fetch_bytes(&cover_url).await?;
        let book = parse_cover(&cover).map_err(|source| RetrieveError::parsing(&cover_url, source))?;

        let pages = range.bounded(book.page_ids.len());
        info!(
            title = %book.title,
            attribution = %book.attribution,
            total_pages = book.page_ids.len(),
            start = pages.start,
            end = pages.end,
            "discovered book"
        );

        Ok(PageSequence {
            fetcher: self.fetcher,
            book: Arc::new(book),
            next_index: pages.start,
            pages,
            finished: false,
        })
    }
}

/// Forward-only, non-restartable sequence of a book's available pages.
///
/// Restricted pages are skipped silently. The first error ends the sequence:
/// it is returned once and every later call yields `Ok(None)`.
#[derive(Debug)]
pub struct PageSequence {
    fetcher: HttpFetcher,
    book: Arc<BookInfo>,
    pages: Range<usize>,
    next_index: usize,
    finished: bool,
}

impl PageSequence {
    /// Book metadata parsed from the cover.
    #[must_use]
    pub fn book(&self) -> &Arc<BookInfo> {
        &self.book
    }

    /// Page indices this sequence walks, clamped to the book length.
    #[must_use]
    pub fn page_range(&self) -> Range<usize> {
        self.pages.clone()
    }

    /// Number of page indices not yet visited.
    #[must_use]
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.pages.end.saturating_sub(self.next_index)
        }
    }

    /// Fetches the next available page.
    ///
    /// Returns `Ok(None)` once the range is exhausted or after an error.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError`] when a page document or image cannot be
    /// fetched, or a page document has neither an image nor the restricted
    /// marker.
    pub async fn next_page(&mut self) -> Result<Option<PageUnit>, RetrieveError> {
        if self.finished {
            return Ok(None);
        }
        let outcome = self.advance().await;
        if !matches!(outcome, Ok(Some(_))) {
            self.finished = true;
        }
        outcome
    }

    async fn advance(&mut self) -> Result<Option<PageUnit>, RetrieveError> {
        let book = Arc::clone(&self.book);
        while self.next_index < self.pages.end {
            let index = self.next_index;
            self.next_index += 1;
            let Some(page_id) = book.page_ids.get(index) else {
                break;
            };

            let page_url = book.page_url(page_id);
            debug!(page = index, page_id = %page_id, url = %page_url, "loading page");
            let html = self.fetcher.fetch_text(&page_url).await?;
            let image_url =
                locate_image(&html).map_err(|source| RetrieveError::parsing(&page_url, source))?;

            let Some(image_url) = image_url else {
                info!(page = index, page_id = %page_id, "page not in preview, skipping");
                continue;
            };

            let image = self.fetcher.fetch_bytes(&image_url).await?;
            debug!(page = index, bytes = image.len(), "page image retrieved");
            return Ok(Some(PageUnit {
                book: Arc::clone(&book),
                page_number: index,
                image,
            }));
        }
        Ok(None)
    }

    /// Adapts the sequence to a [`Stream`] with the same contract.
    pub fn into_stream(self) -> impl Stream<Item = Result<PageUnit, RetrieveError>> {
        futures_util::stream::unfold(self, |mut sequence| async move {
            match sequence.next_page().await {
                Ok(Some(unit)) => Some((Ok(unit), sequence)),
                Ok(None) => None,
                Err(error) => Some((Err(error), sequence)),
            }
        })
    }
}
