//! Single-line progress bar with a completion estimate.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Default bar width in cells.
pub const DEFAULT_WIDTH: usize = 50;

const FILLED: &str = "█";
const EMPTY: &str = "░";

/// Format one progress line. `None` when `total` is zero.
///
/// `current` is expected to be clamped to `total` by the caller.
pub fn format_progress(
    message: &str,
    current: u64,
    total: u64,
    width: usize,
    elapsed: Duration,
) -> Option<String> {
    if total == 0 {
        return None;
    }

    let fraction = current as f64 / total as f64;
    let filled = ((width as f64 * fraction) as usize).min(width);
    let bar = format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(width - filled));

    let eta = if current > 0 {
        let remaining = elapsed.as_secs_f64() * (total - current) as f64 / current as f64;
        format!("ETA: {remaining:.1}s")
    } else {
        "ETA: --".to_string()
    };

    Some(format!(
        "\r{message}: |{bar}| {:.1}% ({current}/{total}) {eta}",
        fraction * 100.0
    ))
}

/// Progress bar redrawn in place on every change.
#[derive(Debug)]
pub struct ProgressBar<W> {
    out: W,
    message: String,
    total: u64,
    current: u64,
    width: usize,
    started: Instant,
}

impl ProgressBar<io::Stdout> {
    pub fn stdout(total: u64, message: impl Into<String>) -> Self {
        Self::new(io::stdout(), total, message)
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn new(out: W, total: u64, message: impl Into<String>) -> Self {
        Self {
            out,
            message: message.into(),
            total,
            current: 0,
            width: DEFAULT_WIDTH,
            started: Instant::now(),
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Advance by `increment`, never past the total.
    pub fn update(&mut self, increment: u64) {
        self.current = self.current.saturating_add(increment).min(self.total);
        self.draw();
    }

    /// Jump to `value`, never past the total.
    pub fn set_progress(&mut self, value: u64) {
        self.current = value.min(self.total);
        self.draw();
    }

    /// Fill the bar and move to the next line.
    pub fn finish(&mut self) {
        self.current = self.total;
        self.draw();
        self.write(b"\n");
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self) {
        let elapsed = self.started.elapsed();
        if let Some(line) =
            format_progress(&self.message, self.current, self.total, self.width, elapsed)
        {
            self.write(line.as_bytes());
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.out.write_all(bytes).and_then(|()| self.out.flush()) {
            log::debug!("progress output failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_way_line() {
        let line = format_progress("Copying", 5, 10, 10, Duration::from_secs(2)).expect("line");
        assert_eq!(line, "\rCopying: |█████░░░░░| 50.0% (5/10) ETA: 2.0s");
    }

    #[test]
    fn test_no_eta_before_progress() {
        let line = format_progress("Copying", 0, 4, 4, Duration::from_secs(1)).expect("line");
        assert_eq!(line, "\rCopying: |░░░░| 0.0% (0/4) ETA: --");
    }

    #[test]
    fn test_zero_total_renders_nothing() {
        assert!(format_progress("x", 0, 0, 50, Duration::ZERO).is_none());

        let mut bar = ProgressBar::new(Vec::new(), 0, "Empty");
        bar.update(3);
        bar.set_progress(9);
        assert!(bar.into_inner().is_empty());
    }

    #[test]
    fn test_update_and_set_progress_clamp() {
        let mut bar = ProgressBar::new(Vec::new(), 10, "Work");
        bar.update(7);
        bar.update(7);
        assert_eq!(bar.current(), 10);
        bar.set_progress(3);
        assert_eq!(bar.current(), 3);
        bar.set_progress(42);
        assert_eq!(bar.current(), 10);
    }

    #[test]
    fn test_finish_fills_and_ends_line() {
        let mut bar = ProgressBar::new(Vec::new(), 3, "Work").with_width(3);
        bar.update(1);
        bar.finish();
        let text = String::from_utf8(bar.into_inner()).expect("utf8");
        assert!(text.contains("|███| 100.0% (3/3) ETA: 0.0s"));
        assert!(text.ends_with('\n'));
    }
}
