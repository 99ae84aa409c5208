//! # Spinner
//!
//! A one-line animation drawn by a background thread while the caller works.
//!
//! The worker owns nothing but a handle to the shared output and the
//! receiving end of a stop channel. It draws a frame, then waits one tick on
//! the channel; a message (or the sender going away) ends the loop, after
//! which the worker blanks the line it drew on. [`Spinner::stop`] sends the
//! signal and joins, so once it returns no further bytes are written.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default delay between frames.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Extra blanks written past the message when clearing the line.
const CLEAR_PADDING: usize = 10;

/// Frame set of a spinner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinnerStyle {
    #[default]
    Dots,
    Classic,
    Arrows,
    Bouncing,
    Pulse,
    Blocks,
    Clock,
    Moon,
}

impl SpinnerStyle {
    pub const ALL: [Self; 8] = [
        Self::Dots,
        Self::Classic,
        Self::Arrows,
        Self::Bouncing,
        Self::Pulse,
        Self::Blocks,
        Self::Clock,
        Self::Moon,
    ];

    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Self::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            Self::Classic => &["|", "/", "-", "\\"],
            Self::Arrows => &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
            Self::Bouncing => &["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"],
            Self::Pulse => &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
            Self::Blocks => &[
                "⣀", "⣄", "⣤", "⣦", "⣶", "⣷", "⣿", "⡿", "⢿", "⣻", "⣽", "⣾",
            ],
            Self::Clock => &[
                "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚", "🕛",
            ],
            Self::Moon => &["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dots => "dots",
            Self::Classic => "classic",
            Self::Arrows => "arrows",
            Self::Bouncing => "bouncing",
            Self::Pulse => "pulse",
            Self::Blocks => "blocks",
            Self::Clock => "clock",
            Self::Moon => "moon",
        }
    }
}

/// How spinners look and behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerOptions {
    pub style: SpinnerStyle,
    pub tick: Duration,
    /// When false the message is printed once and nothing animates.
    pub animate: bool,
}

impl Default for SpinnerOptions {
    fn default() -> Self {
        Self {
            style: SpinnerStyle::default(),
            tick: DEFAULT_TICK,
            animate: true,
        }
    }
}

impl From<&crate::config::Config> for SpinnerOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            style: config.spinner_style,
            tick: Duration::from_millis(config.spinner_tick_ms),
            animate: config.animations,
        }
    }
}

struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// A spinner writing to `W`. Stops itself when dropped.
pub struct Spinner<W: Write + Send + 'static> {
    out: Arc<Mutex<W>>,
    options: SpinnerOptions,
    worker: Option<Worker>,
}

impl<W: Write + Send + 'static> std::fmt::Debug for Spinner<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spinner")
            .field("options", &self.options)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Spinner<io::Stdout> {
    pub fn stdout(options: SpinnerOptions) -> Self {
        Self::new(io::stdout(), options)
    }
}

impl<W: Write + Send + 'static> Spinner<W> {
    pub fn new(out: W, options: SpinnerOptions) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            options,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Start animating `message`. Does nothing if already running.
    ///
    /// # Errors
    ///
    /// Fails when the worker thread cannot be spawned.
    pub fn start(&mut self, message: &str) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        if !self.options.animate {
            write_and_flush(&self.out, format!("{message}\n").as_bytes());
            return Ok(());
        }

        let (stop, stop_rx) = mpsc::channel();
        let out = Arc::clone(&self.out);
        let frames = self.options.style.frames();
        let tick = self.options.tick;
        let message = message.to_string();

        let handle = thread::Builder::new()
            .name("spinner".into())
            .spawn(move || {
                for frame in frames.iter().cycle() {
                    write_and_flush(&out, format!("\r{frame} {message}").as_bytes());
                    match stop_rx.recv_timeout(tick) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                let blank = " ".repeat(message.chars().count() + CLEAR_PADDING);
                write_and_flush(&out, format!("\r{blank}\r").as_bytes());
            })
            .context("Failed to spawn spinner thread")?;

        log::debug!("spinner started ({})", self.options.style.name());
        self.worker = Some(Worker { stop, handle });
        Ok(())
    }

    /// Stop the animation and clear its line. Idempotent.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // A closed channel means the worker already left its loop.
        let _ = worker.stop.send(());
        if worker.handle.join().is_err() {
            log::warn!("spinner thread panicked");
        }
        log::debug!("spinner stopped");
    }

    /// Stop and hand back the output.
    pub fn into_inner(mut self) -> Option<W> {
        self.stop();
        let out = Arc::clone(&self.out);
        drop(self);
        Arc::try_unwrap(out).ok()?.into_inner().ok()
    }
}

impl<W: Write + Send + 'static> Drop for Spinner<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn write_and_flush<W: Write>(out: &Mutex<W>, bytes: &[u8]) {
    let Ok(mut out) = out.lock() else {
        return;
    };
    if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
        log::debug!("spinner output failed: {e}");
    }
}
