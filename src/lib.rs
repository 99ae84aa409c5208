//! magic-menu - flicker-free interactive menus for the terminal
//!
//! This library provides numbered menus driven by arrow keys, digits or plain
//! line input, drawn with partial redraws, plus spinners and progress bars for
//! long-running work started from a menu.

pub mod config;
pub mod logging;
pub mod menu;
pub mod progress;
