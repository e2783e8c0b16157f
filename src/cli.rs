//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use pagegrab_core::DEFAULT_BASE_URL;

/// Download the viewable pages of a book preview and assemble them into a PDF.
///
/// Pages are saved as PNG files under `<output-dir>/<title>/`; once all
/// pages are downloaded they are combined into `<output-dir>/<title>.pdf`.
#[derive(Parser, Debug)]
#[command(name = "pagegrab")]
#[command(author, version, about)]
pub struct Args {
    /// Book id or viewer URL (e.g. https://books.google.com/books?id=EXAMPLE)
    pub book: String,

    /// First page index to download (zero-based)
    #[arg(short, long, default_value_t = 0)]
    pub start: usize,

    /// Page index to stop before (exclusive); defaults to the last page
    #[arg(short, long)]
    pub end: Option<usize>,

    /// Root directory for downloaded books [default: BOOKS]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the page images only; do not assemble a PDF
    #[arg(long)]
    pub no_pdf: bool,

    /// Command used to assemble the PDF (e.g. "img2pdf" or "python img2pdf.py")
    #[arg(long, value_name = "COMMAND")]
    pub assembler: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Viewer base URL
    #[arg(long, hide = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}
