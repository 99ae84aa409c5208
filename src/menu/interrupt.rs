//! # Ctrl+C Outside Raw Mode
//!
//! While a key is being read in raw mode, Ctrl+C arrives as an ordinary key.
//! Everywhere else (line input, between key reads, inside menu actions) the
//! terminal turns it into SIGINT. An installed [`InterruptFlag`] records the
//! signal instead of letting it kill the process; the navigation controller
//! consumes it at its next check and cancels the open menu.
//!
//! A second Ctrl+C before the first one was consumed terminates the process
//! (Unix only), so a hung action can still be killed.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "Ctrl+C was pressed" flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// A flag that no signal sets; only [`InterruptFlag::raise`] does.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag set by SIGINT.
    ///
    /// # Errors
    ///
    /// Fails when the signal handler cannot be registered.
    pub fn install() -> io::Result<Self> {
        use signal_hook::consts::SIGINT;

        let flag = Self::new();
        #[cfg(unix)]
        signal_hook::flag::register_conditional_shutdown(SIGINT, 130, Arc::clone(&flag.raised))?;
        signal_hook::flag::register(SIGINT, Arc::clone(&flag.raised))?;
        log::debug!("SIGINT routed to the interrupt flag");
        Ok(flag)
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Clear the flag, reporting whether it was set.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_the_flag() {
        let flag = InterruptFlag::new();
        assert!(!flag.take());

        flag.raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.is_raised());
        assert!(!flag.take());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let flag = InterruptFlag::new();
        let handle = flag.clone();
        handle.raise();
        assert!(flag.take());
        assert!(!handle.is_raised());
    }
}
