//! Progress bar over the page range of a run.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Decide whether to draw a bar (stderr is a TTY, not quiet, not a dumb terminal).
pub(crate) fn should_show_progress(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term == "dumb")
}

/// Creates a bar sized to `total` page indexes; hidden when `enabled` is false.
pub(crate) fn page_progress(enabled: bool, total: usize, title: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len} pages")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message(title.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Moves the bar to the page index reached so far.
pub(crate) fn advance_to(bar: &ProgressBar, visited: usize) {
    bar.set_position(u64::try_from(visited).unwrap_or(u64::MAX));
}
