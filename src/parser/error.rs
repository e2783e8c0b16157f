//! Error types for identifier resolution and viewer document parsing.

use thiserror::Error;

/// Errors that can occur while turning user input into a book identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// Input is empty, or looks like a URL but carries no `id` parameter.
    #[error(
        "cannot extract a book id from '{input}'\n  Suggestion: pass the bare book id or a viewer URL containing `id=<book id>`"
    )]
    Malformed {
        /// The offending input.
        input: String,
    },
}

impl ReferenceError {
    /// Creates a `Malformed` error for the given input.
    #[must_use]
    pub fn malformed(input: &str) -> Self {
        Self::Malformed {
            input: input.to_string(),
        }
    }
}

/// Errors raised when a viewer document does not match a recognized structure.
///
/// Any of these means the viewer markup has diverged from what the parser
/// understands; retrieval of the book stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An `ie` input element was found without a `value` attribute.
    #[error("encoding hint element has no value attribute")]
    MissingEncodingValue,

    /// The declared encoding label is not a known character encoding.
    #[error("unsupported document encoding '{label}'")]
    UnsupportedEncoding {
        /// The label as found in the document (lower-cased).
        label: String,
    },

    /// The initialization call marker is absent.
    #[error("no initialization payload (_OC_Run call) found in cover document")]
    MissingPayload,

    /// The payload bytes are not valid in the declared encoding.
    #[error("initialization payload is not valid {encoding}")]
    Undecodable {
        /// Name of the encoding used for decoding.
        encoding: &'static str,
    },

    /// The payload is not a valid JSON argument list.
    #[error("malformed initialization payload: {reason}")]
    MalformedPayload {
        /// Decoder error message.
        reason: String,
    },

    /// The payload has fewer than the two required arguments.
    #[error("expected at least 2 initialization arguments, found {found}")]
    MissingArguments {
        /// Number of arguments present.
        found: usize,
    },

    /// An argument object lacks a required field or has an unexpected shape.
    #[error("invalid {object} in initialization payload: {reason}")]
    InvalidField {
        /// Which payload object was being read.
        object: &'static str,
        /// Decoder error message, naming the field.
        reason: String,
    },

    /// The page list is empty.
    #[error("no page ids found in initialization payload")]
    NoPages,

    /// A page document has neither the placeholder marker nor an image.
    #[error("no image found in page document")]
    NoImage,
}
