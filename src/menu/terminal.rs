//! # Terminal Info
//!
//! Queries and caches the terminal size. The cache lives on a
//! [`TerminalInfo`] value rather than in process-wide state; whoever clears
//! the screen calls [`TerminalInfo::invalidate`] so the next read picks up a
//! resized window.

use std::io;

/// Size reported when the terminal cannot be queried (e.g. output piped).
pub const DEFAULT_SIZE: Size = Size {
    columns: 80,
    rows: 24,
};

/// Rows reserved for the header and footer chrome around the item window.
const RESERVED_ROWS: usize = 8;

/// The item window never shrinks below this many rows.
const MIN_AVAILABLE_LINES: usize = 5;

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub columns: usize,
    pub rows: usize,
}

impl Size {
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Rows below 20 or columns below 70 get the compact footer.
    pub fn is_small(self) -> bool {
        self.rows < 20 || self.columns < 70
    }

    /// Rows left for menu items once the chrome is accounted for.
    pub fn available_lines(self) -> usize {
        self.rows
            .saturating_sub(RESERVED_ROWS)
            .max(MIN_AVAILABLE_LINES)
    }
}

/// A cached size plus the generation it was read in.
///
/// The generation increases on every fresh query, so two snapshots with the
/// same generation are guaranteed to describe the same cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    pub size: Size,
    pub generation: u64,
}

type SizeQuery = Box<dyn Fn() -> io::Result<(u16, u16)> + Send>;

/// Cached access to the terminal's column and row count.
pub struct TerminalInfo {
    query: SizeQuery,
    cached: Option<ViewportState>,
    generation: u64,
}

impl std::fmt::Debug for TerminalInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalInfo")
            .field("cached", &self.cached)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for TerminalInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInfo {
    /// Size source backed by the real terminal.
    pub fn new() -> Self {
        Self::with_query(crossterm::terminal::size)
    }

    /// Use a custom size source, e.g. a fixed size in tests.
    pub fn with_query<F>(query: F) -> Self
    where
        F: Fn() -> io::Result<(u16, u16)> + Send + 'static,
    {
        Self {
            query: Box::new(query),
            cached: None,
            generation: 0,
        }
    }

    /// Always report `columns` x `rows`.
    pub fn fixed(columns: u16, rows: u16) -> Self {
        Self::with_query(move || Ok((columns, rows)))
    }

    /// Current viewport, read through the cache.
    pub fn viewport(&mut self) -> ViewportState {
        if let Some(state) = self.cached {
            return state;
        }

        let size = match (self.query)() {
            Ok((columns, rows)) if columns > 0 && rows > 0 => {
                Size::new(usize::from(columns), usize::from(rows))
            }
            Ok((columns, rows)) => {
                log::debug!("terminal reported {columns}x{rows}, using default size");
                DEFAULT_SIZE
            }
            Err(e) => {
                log::debug!("terminal size query failed ({e}), using default size");
                DEFAULT_SIZE
            }
        };

        self.generation += 1;
        let state = ViewportState {
            size,
            generation: self.generation,
        };
        self.cached = Some(state);
        state
    }

    pub fn size(&mut self) -> Size {
        self.viewport().size
    }

    pub fn is_small_viewport(&mut self) -> bool {
        self.size().is_small()
    }

    pub fn available_lines(&mut self) -> usize {
        self.size().available_lines()
    }

    /// Drop the cached size. Call right after clearing the screen.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
