//! # Menu Rendering
//!
//! Draws a menu frame with raw escape sequences.
//!
//! ## Layout
//!
//! ```text
//! row 1   ======================================
//! row 2     Main Menu
//! row 3   ======================================
//! row 4     [DIR] Current Directory: /home/me/project
//! row 5   ======================================
//! row 6     ^ 3 more above...            (only when scrolled)
//!             4. Fourth item
//!           > 5. Fifth item              (highlighted)
//!             6. Sixth item
//!           v 9 more below...            (only when items remain)
//!         ======================================
//!
//!           Use ^/v arrow keys to navigate, Enter to select, or type number
//! ```
//!
//! ## Redraw Strategy
//!
//! A [`Redraw::Full`] clears the screen and paints everything. A
//! [`Redraw::Partial`] only repaints the row that lost the highlight and the
//! row that gained it, addressing them with cursor positioning, so moving
//! through a long list costs two line writes instead of a screen clear.
//! When the frame is taller than the screen and a changed row has scrolled
//! off the top, the partial update falls back to a full redraw.
//!
//! Output is assembled in memory and written in one go. Write failures are
//! logged and swallowed: a menu that cannot paint degrades visually, it does
//! not abort. A closed stream is reported through [`Render::is_broken`].

use super::ansi;
use super::navigation::SelectionState;
use super::terminal::Size;
use std::io::{self, Write};
use std::path::PathBuf;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows taken by the header (three separators, title and directory line).
const HEADER_ROWS: usize = 5;

/// Widest separator / highlight bar, regardless of terminal width.
const MAX_BAR_WIDTH: usize = 70;

const ELLIPSIS: &str = "...";

/// How much of the screen a render call repaints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Clear the screen and paint the whole frame.
    Full,
    /// Repaint the rows of `previous` and the current selection only.
    Partial { previous: usize },
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub title: &'a str,
    pub labels: &'a [&'a str],
    pub selection: SelectionState,
    pub size: Size,
    /// Whether arrow keys work; picks the footer wording.
    pub key_navigation: bool,
}

impl Frame<'_> {
    /// Indices of the items inside the scroll window.
    pub fn visible(&self) -> std::ops::Range<usize> {
        let start = self.selection.scroll_offset.min(self.labels.len());
        let end = (start + self.size.available_lines()).min(self.labels.len());
        start..end
    }

    fn bar_width(&self) -> usize {
        MAX_BAR_WIDTH.min(self.size.columns.saturating_sub(2))
    }
}

/// The drawing surface the navigation controller talks to.
pub trait Render {
    fn render(&mut self, frame: &Frame<'_>, redraw: Redraw);

    fn hide_cursor(&mut self);

    fn show_cursor(&mut self);

    /// Print free-form text (prompts and hints of the numeric fallback).
    fn message(&mut self, text: &str);

    /// True once the output stream is unusable (e.g. the reader went away).
    fn is_broken(&self) -> bool {
        false
    }
}

/// Where the last full frame put things, for later partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    /// Frame row of the first visible item, counted before any scrolling.
    first_item_row: usize,
    /// Rows the terminal scrolled because the frame did not fit.
    scrolled: usize,
    /// Screen row the cursor rests on after a paint.
    park_row: usize,
}

impl Placement {
    /// Screen row of a frame row, `None` once it scrolled off the top.
    fn screen_row(self, frame_row: usize) -> Option<usize> {
        frame_row.checked_sub(self.scrolled).filter(|&row| row >= 1)
    }
}

/// [`Render`] implementation writing escape sequences to a byte stream.
#[derive(Debug)]
pub struct MenuRenderer<W> {
    out: W,
    color: bool,
    directory: Option<PathBuf>,
    placement: Option<Placement>,
    broken: bool,
}

impl MenuRenderer<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> MenuRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            directory: None,
            placement: None,
            broken: false,
        }
    }

    /// Show this path instead of the process working directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, bytes: &[u8]) {
        if self.broken {
            return;
        }
        let result = self.out.write_all(bytes).and_then(|()| self.out.flush());
        if let Err(e) = result {
            log::warn!("menu output failed: {e}");
            if e.kind() == io::ErrorKind::BrokenPipe {
                self.broken = true;
            }
        }
    }

    fn current_directory(&self) -> String {
        match &self.directory {
            Some(dir) => dir.display().to_string(),
            None => std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|_| "?".to_string()),
        }
    }

    fn item_line(&self, frame: &Frame<'_>, index: usize) -> String {
        let columns = frame.size.columns;
        let text = truncate_end(
            &format!("{}. {}", index + 1, frame.labels[index]),
            columns.saturating_sub(6),
        );

        if index == frame.selection.selected {
            let line = pad_to(&format!("  > {text}"), frame.bar_width());
            if self.color {
                format!("{}{line}{}", ansi::HIGHLIGHT, ansi::RESET)
            } else {
                line
            }
        } else {
            format!("    {text}")
        }
    }

    fn paint_full(&mut self, frame: &Frame<'_>) -> io::Result<Vec<u8>> {
        let columns = frame.size.columns;
        let separator = "=".repeat(frame.bar_width());
        let visible = frame.visible();
        let mut buf = Vec::new();

        ansi::clear_screen(&mut buf)?;
        writeln!(buf, "{separator}")?;
        writeln!(
            buf,
            "  {}",
            clamp_width(frame.title, columns.saturating_sub(4))
        )?;
        writeln!(buf, "{separator}")?;

        let mut directory = self.current_directory();
        if display_width(&directory) > columns.saturating_sub(25) {
            directory = truncate_start(&directory, columns.saturating_sub(28));
        }
        writeln!(buf, "  [DIR] Current Directory: {directory}")?;
        writeln!(buf, "{separator}")?;

        let mut rows = HEADER_ROWS;
        if visible.start > 0 {
            let above = format!("  ^ {} more above...", visible.start);
            writeln!(buf, "{}", clamp_width(&above, columns.saturating_sub(2)))?;
            rows += 1;
        }
        let first_item_row = rows + 1;

        for index in visible.clone() {
            writeln!(buf, "{}", self.item_line(frame, index))?;
        }
        rows += visible.len();

        if visible.end < frame.labels.len() {
            let below = format!("  v {} more below...", frame.labels.len() - visible.end);
            writeln!(buf, "{}", clamp_width(&below, columns.saturating_sub(2)))?;
            rows += 1;
        }

        writeln!(buf, "{separator}")?;
        writeln!(buf)?;
        writeln!(buf, "  {}", footer_hint(frame.size, frame.key_navigation))?;
        rows += 3;

        // The cursor ends one row below the frame; anything past the bottom
        // of the screen scrolled the whole frame up.
        let scrolled = (rows + 1).saturating_sub(frame.size.rows);
        self.placement = Some(Placement {
            first_item_row,
            scrolled,
            park_row: rows + 1 - scrolled,
        });

        Ok(buf)
    }

    /// `Ok(None)` when a changed row is no longer on screen.
    fn paint_partial(
        &self,
        frame: &Frame<'_>,
        placement: Placement,
        previous: usize,
    ) -> io::Result<Option<Vec<u8>>> {
        let visible = frame.visible();
        let mut buf = Vec::new();

        let mut changed = vec![previous];
        if frame.selection.selected != previous {
            changed.push(frame.selection.selected);
        }

        for index in changed.into_iter().filter(|i| visible.contains(i)) {
            let Some(row) = placement.screen_row(placement.first_item_row + (index - visible.start))
            else {
                return Ok(None);
            };
            ansi::move_to(&mut buf, row, 1)?;
            ansi::clear_line(&mut buf)?;
            if index != frame.selection.selected && self.color {
                buf.write_all(ansi::RESET.as_bytes())?;
            }
            buf.write_all(self.item_line(frame, index).as_bytes())?;
        }

        ansi::move_to(&mut buf, placement.park_row, 1)?;
        Ok(Some(buf))
    }
}

impl<W: Write> Render for MenuRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>, redraw: Redraw) {
        let painted = match (redraw, self.placement) {
            (Redraw::Partial { previous }, Some(placement)) => {
                match self.paint_partial(frame, placement, previous) {
                    Ok(Some(bytes)) => Ok(bytes),
                    Ok(None) => {
                        log::debug!("changed row scrolled off screen, repainting all");
                        self.paint_full(frame)
                    }
                    Err(e) => Err(e),
                }
            }
            _ => self.paint_full(frame),
        };

        match painted {
            Ok(bytes) => self.emit(&bytes),
            Err(e) => log::warn!("failed to compose menu frame: {e}"),
        }
    }

    fn hide_cursor(&mut self) {
        self.emit(ansi::HIDE_CURSOR.as_bytes());
    }

    fn show_cursor(&mut self) {
        self.emit(ansi::SHOW_CURSOR.as_bytes());
    }

    fn message(&mut self, text: &str) {
        self.emit(text.as_bytes());
    }

    fn is_broken(&self) -> bool {
        self.broken
    }
}

/// Footer wording for the viewport and input capabilities.
pub fn footer_hint(size: Size, key_navigation: bool) -> &'static str {
    match (size.is_small(), key_navigation) {
        (true, true) => "^/v: Navigate | Enter: Select",
        (true, false) => "Type number + Enter",
        (false, true) => "Use ^/v arrow keys to navigate, Enter to select, or type number",
        (false, false) => "Type number and press Enter to select",
    }
}

// ─── Text Fitting ───────────────────────────────────────────────────────────

/// Width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `max` columns.
pub fn clamp_width(text: &str, max: usize) -> &str {
    let mut width = 0;
    for (offset, ch) in text.char_indices() {
        width += ch.width().unwrap_or(0);
        if width > max {
            return &text[..offset];
        }
    }
    text
}

/// Cut `text` to `max` columns, ending in `...` when something was dropped.
pub fn truncate_end(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    let kept = clamp_width(text, max.saturating_sub(ELLIPSIS.len()));
    format!("{kept}{ELLIPSIS}")
}

/// `...` followed by the last `keep` columns of `text`.
pub fn truncate_start(text: &str, keep: usize) -> String {
    let mut width = 0;
    let mut start = text.len();
    for (offset, ch) in text.char_indices().rev() {
        width += ch.width().unwrap_or(0);
        if width > keep {
            break;
        }
        start = offset;
    }
    format!("{ELLIPSIS}{}", &text[start..])
}

/// Right-pad `text` with spaces to `width` columns.
pub fn pad_to(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}
