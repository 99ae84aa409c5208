//! # Navigation Controller
//!
//! The state machine behind a menu invocation.
//!
//! ## States
//!
//! ```text
//!              Up / Down (move, partial redraw)
//!                ┌──────────┐
//!                ▼          │
//!         ┌─────────────┐───┘        Enter / valid Digit
//!  ──────▶│ AwaitingKey │────────────────────────────────▶ Selected
//!         └─────────────┘
//!                │  Interrupt
//!                └───────────────────────────────────────▶ Cancelled
//! ```
//!
//! `Cancelled` reports the last item, which menus conventionally use for
//! Back / Exit. Any other key leaves the state untouched and draws nothing.
//!
//! ## Terminal Safety
//!
//! The cursor is hidden for the whole key loop through a guard that shows it
//! again on every exit path (selection, cancellation, error, panic unwind).
//! Raw mode itself is scoped to each single key read by the
//! [`KeyReader`] implementation.
//!
//! A raised [`InterruptFlag`] (SIGINT outside raw mode) is checked before and
//! after every read and cancels exactly like an `Interrupt` key.

use super::interrupt::InterruptFlag;
use super::input::{platform_reader, raw_input_available, KeyEvent, KeyReader, LineSource};
use super::render::{Frame, MenuRenderer, Redraw, Render};
use super::terminal::TerminalInfo;
use crate::config::Config;
use anyhow::{bail, Context, Result};
use std::io;
use std::time::{Duration, Instant};

/// Default window inside which an identical key counts as a repeat artifact.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(20);

/// Failed key reads tolerated in a row before giving up on the input.
pub const MAX_CONSECUTIVE_READ_ERRORS: usize = 16;

// ─── Selection State ────────────────────────────────────────────────────────

/// Highlighted item and the first item of the scroll window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: usize,
    pub scroll_offset: usize,
}

impl SelectionState {
    /// Move up one item, wrapping from the first to the last.
    pub fn move_up(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            count - 1
        } else {
            self.selected - 1
        };
    }

    /// Move down one item, wrapping from the last to the first.
    pub fn move_down(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.selected = (self.selected + 1) % count;
    }

    /// Shift the scroll window so the selection is inside it.
    ///
    /// Returns whether the offset changed.
    pub fn scroll_into_view(&mut self, count: usize, window: usize) -> bool {
        let before = self.scroll_offset;
        if count <= window || window == 0 {
            self.scroll_offset = 0;
        } else if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + window {
            self.scroll_offset = self.selected + 1 - window;
        }
        self.scroll_offset != before
    }
}

// ─── Transitions ────────────────────────────────────────────────────────────

/// What a key does to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Selection moved away from `previous`.
    Moved { previous: usize },
    /// The user picked an item.
    Selected,
    /// The user bailed out.
    Cancelled,
    /// Nothing to do.
    Ignored,
}

/// Apply `key` to `state` for a menu of `count` items.
pub fn apply_key(state: &mut SelectionState, key: KeyEvent, count: usize) -> Step {
    let previous = state.selected;
    match key {
        KeyEvent::Up => state.move_up(count),
        KeyEvent::Down => state.move_down(count),
        KeyEvent::Enter => return Step::Selected,
        KeyEvent::Digit(n) if n >= 1 && usize::from(n) <= count => {
            state.selected = usize::from(n) - 1;
            return Step::Selected;
        }
        KeyEvent::Interrupt => {
            state.selected = count.saturating_sub(1);
            return Step::Cancelled;
        }
        KeyEvent::Digit(_) | KeyEvent::Other => return Step::Ignored,
    }

    if state.selected == previous {
        Step::Ignored
    } else {
        Step::Moved { previous }
    }
}

// ─── Debounce ───────────────────────────────────────────────────────────────

/// Drops a key identical to the last accepted one inside a short window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<(KeyEvent, Instant)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// A zero window accepts every key.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn accept(&mut self, key: KeyEvent, now: Instant) -> bool {
        if let Some((last_key, at)) = self.last {
            if last_key == key && now.saturating_duration_since(at) < self.window {
                return false;
            }
        }
        self.last = Some((key, now));
        true
    }
}

// ─── Cursor Guard ───────────────────────────────────────────────────────────

/// Keeps the cursor hidden while alive.
struct HiddenCursor<'a, R: Render> {
    renderer: &'a mut R,
}

impl<'a, R: Render> HiddenCursor<'a, R> {
    fn hide(renderer: &'a mut R) -> Self {
        renderer.hide_cursor();
        Self { renderer }
    }

    fn renderer(&mut self) -> &mut R {
        &mut *self.renderer
    }
}

impl<R: Render> Drop for HiddenCursor<'_, R> {
    fn drop(&mut self) {
        self.renderer.show_cursor();
    }
}

// ─── Controller ─────────────────────────────────────────────────────────────

/// Where choices come from.
pub enum Input {
    /// Raw single-key navigation.
    Keys(Box<dyn KeyReader>),
    /// Line-buffered numeric entry, for when stdin is not a terminal.
    Lines(Box<dyn LineSource>),
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keys(_) => f.write_str("Input::Keys"),
            Self::Lines(_) => f.write_str("Input::Lines"),
        }
    }
}

impl Input {
    /// Key input when stdin is a terminal, numeric lines otherwise.
    pub fn detect() -> Self {
        if raw_input_available() {
            Self::Keys(platform_reader())
        } else {
            log::info!("stdin is not a terminal, using numeric line input");
            Self::Lines(Box::new(io::stdin()))
        }
    }

    pub fn has_key_navigation(&self) -> bool {
        matches!(self, Self::Keys(_))
    }
}

/// Outcome of one menu invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// 0-based index of the chosen item.
    pub index: usize,
    /// The user interrupted; `index` is the last item.
    pub cancelled: bool,
}

impl Selection {
    /// 1-based position of the chosen item.
    pub fn ordinal(self) -> usize {
        self.index + 1
    }
}

/// Runs menus: draws them, reads keys and reports the choice.
#[derive(Debug)]
pub struct NavigationController<R> {
    renderer: R,
    viewport: TerminalInfo,
    input: Input,
    debouncer: Debouncer,
    interrupts: InterruptFlag,
}

impl NavigationController<MenuRenderer<io::Stdout>> {
    /// Controller on the real terminal, configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let input = if config.line_input {
            Input::Lines(Box::new(io::stdin()))
        } else {
            Input::detect()
        };
        Self::new(
            MenuRenderer::stdout(config.color),
            TerminalInfo::new(),
            input,
        )
        .with_debounce(Duration::from_millis(config.key_debounce_ms))
    }
}

impl<R: Render> NavigationController<R> {
    pub fn new(renderer: R, viewport: TerminalInfo, input: Input) -> Self {
        Self {
            renderer,
            viewport,
            input,
            debouncer: Debouncer::default(),
            interrupts: InterruptFlag::new(),
        }
    }

    /// Cancel menus when `flag` is raised.
    pub fn with_interrupts(mut self, flag: InterruptFlag) -> Self {
        self.interrupts = flag;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debouncer = Debouncer::new(window);
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Run a menu and return the 1-based position of the chosen item.
    ///
    /// Cancellation returns `labels.len()`.
    ///
    /// # Errors
    ///
    /// Fails when `labels` is empty, the output stream is closed, or the
    /// input keeps failing.
    pub fn choose(&mut self, title: &str, labels: &[&str]) -> Result<usize> {
        self.run(title, labels).map(Selection::ordinal)
    }

    /// Run a menu and return the full [`Selection`].
    ///
    /// # Errors
    ///
    /// See [`NavigationController::choose`].
    pub fn run(&mut self, title: &str, labels: &[&str]) -> Result<Selection> {
        if labels.is_empty() {
            bail!("Menu '{title}' has no items");
        }
        log::debug!("menu '{}' opened with {} items", title, labels.len());

        let key_navigation = self.input.has_key_navigation();
        let Self {
            renderer,
            viewport,
            input,
            debouncer,
            interrupts,
        } = self;
        let mut menu = MenuSession {
            title,
            labels,
            state: SelectionState::default(),
            viewport,
            key_navigation,
            interrupts,
        };

        let selection = match input {
            Input::Keys(reader) => menu.key_loop(renderer, reader.as_mut(), debouncer)?,
            Input::Lines(lines) => menu.line_loop(renderer, lines.as_mut())?,
        };

        log::debug!(
            "menu '{}' closed: item {}{}",
            title,
            selection.ordinal(),
            if selection.cancelled { " (cancelled)" } else { "" }
        );
        Ok(selection)
    }
}

/// State for the duration of a single menu invocation.
struct MenuSession<'a> {
    title: &'a str,
    labels: &'a [&'a str],
    state: SelectionState,
    viewport: &'a mut TerminalInfo,
    key_navigation: bool,
    interrupts: &'a InterruptFlag,
}

impl MenuSession<'_> {
    fn redraw<R: Render>(&mut self, renderer: &mut R, requested: Redraw) -> Result<()> {
        let count = self.labels.len();
        let scrolled = self
            .state
            .scroll_into_view(count, self.viewport.available_lines());
        let redraw = if scrolled { Redraw::Full } else { requested };

        if redraw == Redraw::Full {
            self.viewport.invalidate();
            self.state
                .scroll_into_view(count, self.viewport.available_lines());
        }

        let frame = Frame {
            title: self.title,
            labels: self.labels,
            selection: self.state,
            size: self.viewport.size(),
            key_navigation: self.key_navigation,
        };
        renderer.render(&frame, redraw);

        if renderer.is_broken() {
            bail!("Menu output stream is closed");
        }
        Ok(())
    }

    fn key_loop<R: Render>(
        &mut self,
        renderer: &mut R,
        reader: &mut dyn KeyReader,
        debouncer: &mut Debouncer,
    ) -> Result<Selection> {
        let mut cursor = HiddenCursor::hide(renderer);
        self.redraw(cursor.renderer(), Redraw::Full)?;
        let count = self.labels.len();
        let mut failures = 0;

        loop {
            let read = if self.interrupts.take() {
                Ok(KeyEvent::Interrupt)
            } else {
                reader.read_key()
            };
            let key = match read {
                _ if self.interrupts.take() => KeyEvent::Interrupt,
                Ok(key) => {
                    failures = 0;
                    key
                }
                Err(e) => {
                    failures += 1;
                    log::warn!("key read failed ({failures} in a row): {e}");
                    if failures >= MAX_CONSECUTIVE_READ_ERRORS {
                        return Err(e).context("Keyboard input keeps failing");
                    }
                    continue;
                }
            };

            if key != KeyEvent::Interrupt && !debouncer.accept(key, Instant::now()) {
                log::trace!("debounced repeated {key:?}");
                continue;
            }

            match apply_key(&mut self.state, key, count) {
                Step::Moved { previous } => {
                    self.redraw(cursor.renderer(), Redraw::Partial { previous })?;
                }
                Step::Selected => {
                    return Ok(Selection {
                        index: self.state.selected,
                        cancelled: false,
                    });
                }
                Step::Cancelled => {
                    return Ok(Selection {
                        index: self.state.selected,
                        cancelled: true,
                    });
                }
                Step::Ignored => {}
            }
        }
    }

    fn line_loop<R: Render>(
        &mut self,
        renderer: &mut R,
        lines: &mut dyn LineSource,
    ) -> Result<Selection> {
        self.redraw(renderer, Redraw::Full)?;
        let count = self.labels.len();
        let mut failures = 0;

        loop {
            if self.interrupts.take() {
                return Ok(self.cancel_from_line(renderer));
            }
            renderer.message("\nEnter your choice: ");
            let read = lines.read_line();
            if self.interrupts.take() {
                return Ok(self.cancel_from_line(renderer));
            }
            let line = match read {
                Ok(Some(line)) => {
                    failures = 0;
                    line
                }
                Ok(None) => return Ok(self.cancel_from_line(renderer)),
                Err(e) => {
                    failures += 1;
                    log::warn!("line read failed ({failures} in a row): {e}");
                    if failures >= MAX_CONSECUTIVE_READ_ERRORS {
                        return Err(e).context("Line input keeps failing");
                    }
                    renderer.message("Please enter a valid number\n");
                    continue;
                }
            };

            match line.trim().parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => {
                    return Ok(Selection {
                        index: n - 1,
                        cancelled: false,
                    });
                }
                Ok(_) => renderer.message(&format!("Please enter a number between 1 and {count}\n")),
                Err(_) => renderer.message("Please enter a valid number\n"),
            }
            if renderer.is_broken() {
                bail!("Menu output stream is closed");
            }
        }
    }

    /// End line input on EOF or Ctrl+C with the last item.
    fn cancel_from_line<R: Render>(&mut self, renderer: &mut R) -> Selection {
        renderer.message("\n");
        self.state.selected = self.labels.len() - 1;
        Selection {
            index: self.state.selected,
            cancelled: true,
        }
    }
}
