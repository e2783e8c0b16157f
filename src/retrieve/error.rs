//! Error types for book retrieval.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::parser::{ParseError, ReferenceError};

/// Coarse classification of a [`RetrieveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input could not be turned into a book identifier.
    MalformedReference,
    /// Transport failure, timeout, or non-success status.
    Network,
    /// A fetched document did not match a recognized structure.
    Parsing,
    /// The retriever itself was misconfigured.
    Configuration,
}

/// Errors that abort the retrieval of a book.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The input is not a book identifier or viewer URL.
    #[error(transparent)]
    MalformedReference(#[from] ReferenceError),

    /// A request failed; nothing is retried.
    #[error(transparent)]
    Network(#[from] FetchError),

    /// A cover or page document could not be understood.
    #[error("cannot parse {url}: {source}")]
    Parsing {
        /// URL of the offending document.
        url: String,
        /// What was wrong with it.
        #[source]
        source: ParseError,
    },

    /// The configured viewer base URL is not an absolute URL.
    #[error("invalid viewer base URL '{url}'")]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
    },
}

impl RetrieveError {
    /// Creates a parsing error tied to the document URL.
    pub fn parsing(url: impl Into<String>, source: ParseError) -> Self {
        Self::Parsing {
            url: url.into(),
            source,
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedReference(_) => ErrorKind::MalformedReference,
            Self::Network(FetchError::Client { .. }) | Self::InvalidBaseUrl { .. } => {
                ErrorKind::Configuration
            }
            Self::Network(_) => ErrorKind::Network,
            Self::Parsing { .. } => ErrorKind::Parsing,
        }
    }
}
