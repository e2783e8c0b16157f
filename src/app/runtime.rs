use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pagegrab_core::{BookDirectory, BookRetriever, DocumentAssembler, Img2PdfAssembler};
use tracing::{debug, info, warn};

use crate::app::progress;
use crate::app::settings::RunSettings;

/// Outcome of one book run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) title: String,
    pub(crate) pages_saved: usize,
    pub(crate) document: Option<PathBuf>,
}

pub(crate) async fn run(settings: RunSettings) -> Result<RunSummary> {
    let retriever = BookRetriever::with_base_url(settings.fetch, &settings.base_url)
        .context("Failed to initialize the viewer client")?;
    let mut pages = retriever
        .open(&settings.book, settings.range)
        .await
        .with_context(|| format!("Failed to open book '{}'", settings.book))?;

    let book = Arc::clone(pages.book());
    let directory = BookDirectory::new(&settings.output_root, &book);
    let range = pages.page_range();

    let show_progress = progress::should_show_progress(
        io::stderr().is_terminal(),
        settings.quiet,
        progress::is_dumb_terminal(),
    );
    let bar = progress::page_progress(show_progress, range.len(), &book.title);

    let mut pages_saved = 0usize;
    loop {
        let unit = match pages.next_page().await {
            Ok(Some(unit)) => unit,
            Ok(None) => break,
            Err(error) => {
                bar.abandon();
                return Err(error).with_context(|| {
                    format!(
                        "Retrieval of '{}' stopped after {pages_saved} saved page(s)",
                        book.title
                    )
                });
            }
        };

        if pages_saved == 0 {
            directory.create().await?;
            debug!(dir = %directory.path().display(), "created book directory");
        }
        let path = directory.save_page(&unit).await?;
        pages_saved += 1;
        bar.suspend(|| info!(page = unit.page_number, path = %path.display(), "saved page"));
        progress::advance_to(&bar, range.len() - pages.remaining());
    }
    bar.finish_and_clear();

    let mut summary = RunSummary {
        title: book.title.clone(),
        pages_saved,
        document: None,
    };

    if pages_saved == 0 {
        warn!(title = %book.title, "no viewable pages in the requested range; nothing saved");
        return Ok(summary);
    }
    info!(title = %book.title, pages = pages_saved, dir = %directory.path().display(), "download complete");

    if !settings.assemble {
        info!("document assembly disabled; page images kept");
        return Ok(summary);
    }

    let images = directory.list_images().await?;
    let mut assembler = Img2PdfAssembler::new(&settings.output_root);
    if let Some(command) = settings.assembler.as_deref() {
        assembler = assembler.with_command(command);
    }
    let document = assemble_document(&assembler, &images, directory.title(), directory.path()).await?;
    summary.document = Some(document);
    Ok(summary)
}

async fn assemble_document(
    assembler: &dyn DocumentAssembler,
    images: &[PathBuf],
    title: &str,
    image_dir: &Path,
) -> Result<PathBuf> {
    let document = assembler.assemble(images, title).await.with_context(|| {
        format!(
            "Failed to assemble '{title}'; page images are kept in {}",
            image_dir.display()
        )
    })?;
    info!(document = %document.display(), "saved document");
    Ok(document)
}
