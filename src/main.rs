//! CLI entry point for pagegrab.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

mod app;
mod app_config;
mod cli;

use app::{runtime, settings};
use app_config::LoadedConfig;
use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Config errors are reported before a subscriber exists.
    let loaded = match app_config::load_default_file_config() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = settings::resolve_default_log_level(&args, loaded.config.as_ref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run_cli(&args, &loaded).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(args: &Args, loaded: &LoadedConfig) -> Result<()> {
    let file_config = loaded.config.as_ref();
    debug!(
        ?args,
        config_path = ?loaded.path,
        config_loaded = file_config.is_some(),
        "CLI arguments parsed"
    );

    let run_settings = settings::resolve_settings(args, file_config)?;
    info!(book = %run_settings.book, output = %run_settings.output_root.display(), "pagegrab starting");

    let summary = runtime::run(run_settings).await?;
    if let Some(document) = &summary.document {
        println!("{}", document.display());
    }
    info!(
        title = %summary.title,
        pages = summary.pages_saved,
        assembled = summary.document.is_some(),
        "run finished"
    );
    Ok(())
}
