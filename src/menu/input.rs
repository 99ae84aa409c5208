//! # Key Input
//!
//! Reads one logical key at a time from the terminal.
//!
//! ## Backends
//!
//! | Reader | Platform | Arrow encoding |
//! |--------|----------|----------------|
//! | [`PosixKeyReader`] | Unix terminals | bytes: `ESC [ A` / `ESC [ B` (also `ESC O A/B`, with or without parameters) |
//! | [`ConsoleKeyReader`] | Windows console | console key records through crossterm events |
//!
//! The console does not deliver arrow keys as bytes on stdin at all, so that
//! backend reads crossterm's decoded key events instead.
//!
//! Both put the terminal in raw mode for the duration of a single
//! [`KeyReader::read_key`] call only, through a [`RawModeGuard`] that
//! restores the previous mode on every exit path. Multi-byte sequences are
//! consumed inside that one call, so callers only ever see a whole
//! [`KeyEvent`].
//!
//! When stdin is not a terminal no key reader is used at all; the
//! navigation controller falls back to a [`LineSource`].

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::tty::IsTty;
use std::collections::VecDeque;
use std::io::{self, BufRead, Read};

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Up,
    Down,
    Enter,
    /// A digit key, `0..=9`.
    Digit(u8),
    /// Ctrl+C, Ctrl+D or end of input.
    Interrupt,
    Other,
}

/// Blocking "read one key" operation.
pub trait KeyReader {
    fn read_key(&mut self) -> io::Result<KeyEvent>;
}

/// Blocking "read one line" operation for the numeric fallback.
///
/// `Ok(None)` means end of input.
pub trait LineSource {
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Switches the terminal in and out of raw mode.
pub trait RawModeControl {
    fn enable(&mut self) -> io::Result<()>;
    fn disable(&mut self) -> io::Result<()>;
}

/// Raw mode through crossterm (termios on Unix, console modes on Windows).
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermRawMode;

impl RawModeControl for CrosstermRawMode {
    fn enable(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable(&mut self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

/// Raw mode held for the guard's lifetime.
pub struct RawModeGuard<'a, C: RawModeControl> {
    control: &'a mut C,
}

impl<'a, C: RawModeControl> RawModeGuard<'a, C> {
    pub fn acquire(control: &'a mut C) -> io::Result<Self> {
        control.enable()?;
        Ok(Self { control })
    }
}

impl<C: RawModeControl> Drop for RawModeGuard<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.control.disable() {
            log::warn!("failed to leave raw mode: {e}");
        }
    }
}

// ─── Byte Decoding ──────────────────────────────────────────────────────────

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const ESC: u8 = 0x1b;

/// Read a single byte; `None` at end of input.
fn next_byte(source: &mut impl Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match source.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn decode_plain(byte: u8) -> KeyEvent {
    match byte {
        b'\r' | b'\n' => KeyEvent::Enter,
        b'0'..=b'9' => KeyEvent::Digit(byte - b'0'),
        _ => KeyEvent::Other,
    }
}

/// Decode one key from a POSIX terminal byte stream.
pub fn decode_posix(source: &mut impl Read) -> io::Result<KeyEvent> {
    let Some(byte) = next_byte(source)? else {
        return Ok(KeyEvent::Interrupt);
    };

    let key = match byte {
        ESC => match next_byte(source)? {
            Some(b'[' | b'O') => decode_sequence_tail(source)?,
            _ => KeyEvent::Other,
        },
        CTRL_C | CTRL_D => KeyEvent::Interrupt,
        other => decode_plain(other),
    };
    Ok(key)
}

/// Consume parameter and intermediate bytes (`0x20..=0x3F`) up to the final
/// byte of a CSI / SS3 sequence. Only `A` and `B` finals are arrows.
fn decode_sequence_tail(source: &mut impl Read) -> io::Result<KeyEvent> {
    loop {
        match next_byte(source)? {
            Some(0x20..=0x3F) => {}
            Some(b'A') => return Ok(KeyEvent::Up),
            Some(b'B') => return Ok(KeyEvent::Down),
            _ => return Ok(KeyEvent::Other),
        }
    }
}

// ─── Console Events ─────────────────────────────────────────────────────────

/// Map a crossterm event to a key. `None` for events that are not key
/// presses (releases, resizes, focus, mouse).
pub fn decode_event(event: &Event) -> Option<KeyEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let decoded = match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyEvent::Interrupt
        }
        KeyCode::Up => KeyEvent::Up,
        KeyCode::Down => KeyEvent::Down,
        KeyCode::Enter => KeyEvent::Enter,
        KeyCode::Char(c @ '0'..='9') => KeyEvent::Digit(c as u8 - b'0'),
        _ => KeyEvent::Other,
    };
    Some(decoded)
}

/// Blocking source of terminal events.
pub trait EventSource {
    fn read_event(&mut self) -> io::Result<Event>;
}

/// Events from the real terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn read_event(&mut self) -> io::Result<Event> {
        event::read()
    }
}

// ─── Readers ────────────────────────────────────────────────────────────────

/// Key reader for POSIX terminals.
pub struct PosixKeyReader<R, C = CrosstermRawMode> {
    source: R,
    raw_mode: C,
}

impl<R: Read, C: RawModeControl> PosixKeyReader<R, C> {
    pub fn new(source: R, raw_mode: C) -> Self {
        Self { source, raw_mode }
    }
}

impl<R: Read, C: RawModeControl> KeyReader for PosixKeyReader<R, C> {
    fn read_key(&mut self) -> io::Result<KeyEvent> {
        let _raw = RawModeGuard::acquire(&mut self.raw_mode)?;
        decode_posix(&mut self.source)
    }
}

/// Key reader for the Windows console.
pub struct ConsoleKeyReader<E = CrosstermEvents, C = CrosstermRawMode> {
    events: E,
    raw_mode: C,
}

impl<E: EventSource, C: RawModeControl> ConsoleKeyReader<E, C> {
    pub fn new(events: E, raw_mode: C) -> Self {
        Self { events, raw_mode }
    }
}

impl<E: EventSource, C: RawModeControl> KeyReader for ConsoleKeyReader<E, C> {
    fn read_key(&mut self) -> io::Result<KeyEvent> {
        let _raw = RawModeGuard::acquire(&mut self.raw_mode)?;
        loop {
            if let Some(key) = decode_event(&self.events.read_event()?) {
                return Ok(key);
            }
        }
    }
}

/// The key reader for the platform this binary was built for.
pub fn platform_reader() -> Box<dyn KeyReader> {
    #[cfg(windows)]
    {
        Box::new(ConsoleKeyReader::new(CrosstermEvents, CrosstermRawMode))
    }
    #[cfg(not(windows))]
    {
        Box::new(PosixKeyReader::new(io::stdin(), CrosstermRawMode))
    }
}

/// Whether raw key input can be used at all.
pub fn raw_input_available() -> bool {
    io::stdin().is_tty()
}

// ─── Line Input ─────────────────────────────────────────────────────────────

/// Lines from any buffered reader.
#[derive(Debug)]
pub struct BufLines<B> {
    inner: B,
}

impl<B: BufRead> BufLines<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<B: BufRead> LineSource for BufLines<B> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Stdin is not kept locked between lines.
impl LineSource for io::Stdin {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::Stdin::read_line(self, &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

// ─── Scripted Input ─────────────────────────────────────────────────────────

/// Replays a fixed sequence of keys; reports `Interrupt` once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<io::Result<KeyEvent>>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().map(Ok).collect(),
        }
    }

    /// Queue a failed read.
    pub fn push_error(&mut self, kind: io::ErrorKind) {
        self.keys.push_back(Err(io::Error::from(kind)));
    }

    pub fn push(&mut self, key: KeyEvent) {
        self.keys.push_back(Ok(key));
    }
}

impl KeyReader for ScriptedKeys {
    fn read_key(&mut self) -> io::Result<KeyEvent> {
        self.keys.pop_front().unwrap_or(Ok(KeyEvent::Interrupt))
    }
}

/// Replays a fixed sequence of lines, then end of input.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
