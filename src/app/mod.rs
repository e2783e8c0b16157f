//! Binary-side orchestration: settings resolution, progress, and the run loop.

pub(crate) mod progress;
pub(crate) mod runtime;
pub(crate) mod settings;
