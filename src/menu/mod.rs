//! # Menu Engine
//!
//! Interactive numbered menus for the terminal.
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ansi`] | Escape sequences for cursor and screen control |
//! | [`terminal`] | Cached terminal size |
//! | [`render`] | Full and partial frame drawing |
//! | [`input`] | Key decoding, raw mode, line input |
//! | [`interrupt`] | Ctrl+C outside raw mode |
//! | [`navigation`] | Selection state machine and menu loop |
//! | [`item`] | Action menus and stock dialogs |

pub mod ansi;
pub mod input;
pub mod interrupt;
pub mod item;
pub mod navigation;
pub mod render;
pub mod terminal;

pub use input::{KeyEvent, KeyReader, LineSource, ScriptedKeys, ScriptedLines};
pub use interrupt::InterruptFlag;
pub use item::{confirm, select_option, Menu, MenuFlow, MenuItem};
pub use navigation::{Input, NavigationController, Selection, SelectionState};
pub use render::{Frame, MenuRenderer, Redraw, Render};
pub use terminal::{Size, TerminalInfo};
