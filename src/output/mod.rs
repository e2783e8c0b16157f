//! On-disk layout for retrieved pages.
//!
//! Each book gets its own directory under an output root, named after the
//! title. Pages are saved as `<attribution> - <title>.page-<NNN>.png`, where
//! `NNN` is the one-based page index padded to three digits, so that a plain
//! filename sort restores reading order.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::parser::BookInfo;
use crate::retrieve::PageUnit;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "BOOKS";

/// Name used when a title sanitizes to nothing.
const UNTITLED: &str = "untitled";

/// Errors raised while writing or listing page files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File system error.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Output directory of a single book.
#[derive(Debug, Clone)]
pub struct BookDirectory {
    dir: PathBuf,
    title: String,
    attribution: String,
}

impl BookDirectory {
    /// Plans the directory for `book` under `root`; nothing is created yet.
    #[must_use]
    pub fn new(root: &Path, book: &BookInfo) -> Self {
        let title = sanitize_path_component(&book.title);
        let title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };
        Self {
            dir: root.join(&title),
            title,
            attribution: sanitize_path_component(&book.attribution),
        }
    }

    /// The book directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Sanitized title used for the directory and document names.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Filename for the zero-based `page_number`.
    #[must_use]
    pub fn page_filename(&self, page_number: usize) -> String {
        let page = page_number + 1;
        if self.attribution.is_empty() {
            format!("{}.page-{page:03}.png", self.title)
        } else {
            format!("{} - {}.page-{page:03}.png", self.attribution, self.title)
        }
    }

    /// Creates the book directory (and the root) if missing.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] when the directory cannot be created.
    pub async fn create(&self) -> Result<(), OutputError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| OutputError::io(&self.dir, e))
    }

    /// Writes the page image and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] when the file cannot be written.
    pub async fn save_page(&self, unit: &PageUnit) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(self.page_filename(unit.page_number));
        tokio::fs::write(&path, &unit.image)
            .await
            .map_err(|e| OutputError::io(&path, e))?;
        debug!(path = %path.display(), bytes = unit.image.len(), "saved page");
        Ok(path)
    }

    /// Lists the files in the book directory, sorted by filename.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] when the directory cannot be read.
    pub async fn list_images(&self) -> Result<Vec<PathBuf>, OutputError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| OutputError::io(&self.dir, e))?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OutputError::io(&self.dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| OutputError::io(entry.path(), e))?;
            if file_type.is_file() {
                files.push(entry.path());
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

/// Replaces characters that are unsafe in a single path component.
///
/// Separators, reserved punctuation and control characters become `_`;
/// surrounding whitespace and dots are trimmed.
#[must_use]
pub fn sanitize_path_component(value: &str) -> String {
    let mapped: String = value
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    mapped
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string()
}
