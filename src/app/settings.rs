//! Merges CLI flags, the config file, and built-in defaults into run settings.

use std::path::PathBuf;

use anyhow::{Result, bail};
use pagegrab_core::{DEFAULT_OUTPUT_ROOT, FetchSettings, PageRange};

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Everything a single run needs, after precedence has been applied.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) book: String,
    pub(crate) range: PageRange,
    pub(crate) output_root: PathBuf,
    pub(crate) fetch: FetchSettings,
    pub(crate) assemble: bool,
    pub(crate) assembler: Option<String>,
    pub(crate) base_url: String,
    pub(crate) quiet: bool,
}

/// Applies CLI > config file > defaults.
pub(crate) fn resolve_settings(args: &Args, file_config: Option<&FileConfig>) -> Result<RunSettings> {
    if let Some(end) = args.end
        && end <= args.start
    {
        bail!(
            "Invalid page range: --end ({end}) must be greater than --start ({})",
            args.start
        );
    }

    let defaults = FetchSettings::default();
    let fetch = FetchSettings {
        connect_timeout_secs: file_config
            .and_then(|cfg| cfg.connect_timeout_secs)
            .unwrap_or(defaults.connect_timeout_secs),
        read_timeout_secs: file_config
            .and_then(|cfg| cfg.read_timeout_secs)
            .unwrap_or(defaults.read_timeout_secs),
    };

    let output_root = args
        .output_dir
        .clone()
        .or_else(|| file_config.and_then(|cfg| cfg.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));

    let assemble = if args.no_pdf {
        false
    } else {
        file_config.and_then(|cfg| cfg.assemble).unwrap_or(true)
    };

    let assembler = args
        .assembler
        .clone()
        .or_else(|| file_config.and_then(|cfg| cfg.assembler.clone()));

    let quiet = args.quiet || (args.verbose == 0 && is_config_quiet(file_config));

    Ok(RunSettings {
        book: args.book.clone(),
        range: PageRange::new(args.start, args.end),
        output_root,
        fetch,
        assemble,
        assembler,
        base_url: args.base_url.clone(),
        quiet,
    })
}

fn is_config_quiet(file_config: Option<&FileConfig>) -> bool {
    file_config
        .and_then(|cfg| cfg.verbosity)
        .is_some_and(|verbosity| verbosity == crate::app_config::VerbositySetting::Quiet)
}

/// Default log directive used when `RUST_LOG` is not set.
///
/// Priority: `--quiet` > `-v` count > config `verbosity` > `info`.
pub(crate) fn resolve_default_log_level(args: &Args, file_config: Option<&FileConfig>) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => file_config
            .and_then(|cfg| cfg.verbosity)
            .map_or("info", |verbosity| verbosity.log_level()),
        1 => "debug",
        _ => "trace",
    }
}
