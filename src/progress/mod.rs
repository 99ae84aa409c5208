//! # Progress Feedback
//!
//! Spinners and progress bars for work that runs outside a menu, plus two
//! wrappers that put feedback around a closure.

pub mod bar;
pub mod spinner;

pub use bar::ProgressBar;
pub use spinner::{Spinner, SpinnerOptions, SpinnerStyle};

use anyhow::Result;
use std::io::{self, Write};
use std::time::Instant;

/// Run `work` with a spinner showing `message` on stdout.
///
/// The spinner is stopped and its line cleared before this returns,
/// whether `work` succeeded or not.
///
/// # Errors
///
/// Returns the error of `work`, or a failure to start the spinner.
pub fn with_spinner<T>(
    message: &str,
    options: SpinnerOptions,
    work: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let mut spinner = Spinner::stdout(options);
    spinner.start(message)?;
    let result = work();
    spinner.stop();
    result
}

/// Run `work` and report its duration on stdout.
///
/// # Errors
///
/// Returns the error of `work` unchanged.
pub fn timed<T>(label: &str, work: impl FnOnce() -> Result<T>) -> Result<T> {
    timed_to(&mut io::stdout(), label, work)
}

/// [`timed`] writing its report to `out`.
///
/// # Errors
///
/// Returns the error of `work` unchanged.
pub fn timed_to<T, W: Write>(
    out: &mut W,
    label: &str,
    work: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let started = Instant::now();
    let result = work();
    let secs = started.elapsed().as_secs_f64();

    let report = match &result {
        Ok(_) => writeln!(out, "✓ {label} completed in {secs:.2}s"),
        Err(e) => writeln!(out, "✗ {label} failed after {secs:.2}s: {e}"),
    };
    if let Err(e) = report {
        log::debug!("timing report failed: {e}");
    }
    log::info!("{label} took {secs:.3}s");
    result
}
