//! # Escape Sequences
//!
//! Byte-level encoding of the handful of terminal commands the menu uses.
//! Every function writes to any `impl Write` and propagates the writer's
//! error; deciding what to do with a failed write is the renderer's job.
//!
//! Rows and columns are 1-based here, exactly as the terminal sees them.

use std::io::{self, Write};

/// Hide the cursor (DECTCEM reset).
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// Show the cursor (DECTCEM set).
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Erase the whole display, then home the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
/// Erase the entire current line.
pub const CLEAR_LINE: &str = "\x1b[2K";
/// Bold text on a cyan background, used for the selected item.
pub const HIGHLIGHT: &str = "\x1b[1;46m";
/// Reset all SGR attributes.
pub const RESET: &str = "\x1b[0m";

pub fn hide_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(HIDE_CURSOR.as_bytes())
}

pub fn show_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(SHOW_CURSOR.as_bytes())
}

pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN.as_bytes())
}

pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_LINE.as_bytes())
}

/// Move the cursor with CUP. Both coordinates are 1-based.
pub fn move_to(w: &mut impl Write, row: usize, col: usize) -> io::Result<()> {
    write!(w, "\x1b[{row};{col}H")
}
