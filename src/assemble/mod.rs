//! Document assembly from saved page images.
//!
//! Retrieval never depends on how (or whether) a conversion tool is
//! installed: the CLI hands the saved files to a [`DocumentAssembler`] once
//! the page sequence is exhausted. The default implementation,
//! [`Img2PdfAssembler`], runs an image-to-PDF command as a subprocess.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::output::sanitize_path_component;

/// Default conversion command.
pub const DEFAULT_ASSEMBLER_PROGRAM: &str = "img2pdf";

/// Errors raised while assembling a document.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// There is nothing to assemble.
    #[error("no page images to assemble for '{title}'")]
    NoImages {
        /// Book title.
        title: String,
    },

    /// The conversion command could not be started.
    #[error(
        "failed to start '{program}': {source}\n  Suggestion: install it or set `assembler` in the config file"
    )]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The conversion command exited unsuccessfully.
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        /// Program that failed.
        program: String,
        /// Exit status description.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },
}

/// Produces one document from a book's page images.
#[async_trait]
pub trait DocumentAssembler: Send + Sync {
    /// Assembles `image_paths`, in filename-sorted order, into a document
    /// named after `title`, and returns the document path.
    async fn assemble(
        &self,
        image_paths: &[PathBuf],
        title: &str,
    ) -> Result<PathBuf, AssembleError>;
}

/// Runs `<program> [args...] <images...> -o <output_dir>/<title>.pdf`.
#[derive(Debug, Clone)]
pub struct Img2PdfAssembler {
    program: String,
    args: Vec<String>,
    output_dir: PathBuf,
}

impl Img2PdfAssembler {
    /// Creates an assembler writing into `output_dir` with the default program.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_ASSEMBLER_PROGRAM.to_string(),
            args: Vec::new(),
            output_dir: output_dir.into(),
        }
    }

    /// Uses a whitespace-separated command line (e.g. `python img2pdf.py`)
    /// instead of the default program. Blank commands are ignored.
    #[must_use]
    pub fn with_command(mut self, command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        if let Some(program) = words.next() {
            self.program = program;
            self.args = words.collect();
        }
        self
    }

    /// Output path for `title`.
    #[must_use]
    pub fn output_path(&self, title: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.pdf", sanitize_path_component(title)))
    }

    /// Program that will be executed.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl DocumentAssembler for Img2PdfAssembler {
    #[instrument(skip(self, image_paths), fields(images = image_paths.len(), program = %self.program))]
    async fn assemble(
        &self,
        image_paths: &[PathBuf],
        title: &str,
    ) -> Result<PathBuf, AssembleError> {
        if image_paths.is_empty() {
            return Err(AssembleError::NoImages {
                title: title.to_string(),
            });
        }

        let mut sorted: Vec<&Path> = image_paths.iter().map(PathBuf::as_path).collect();
        sorted.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        let output = self.output_path(title);
        debug!(output = %output.display(), "running document assembler");

        let result = Command::new(&self.program)
            .args(&self.args)
            .args(&sorted)
            .arg("-o")
            .arg(&output)
            .output()
            .await
            .map_err(|source| AssembleError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(AssembleError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        info!(output = %output.display(), "document assembled");
        Ok(output)
    }
}
