//! Process-wide terminal session.
//!
//! Curses keeps one screen and one locale per process. [`TerminalSession`]
//! is the handle for that state: only one can be alive at a time, acquiring
//! it initializes the locale and resolves capabilities, a screen can only be
//! configured through it, and dropping it tears everything down in order.

use std::os::fd::BorrowedFd;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::caps::{Capabilities, capabilities};
use crate::locale::init_locale;
use crate::screen::Screen;
use crate::termcaps::TermCaps;
use crate::{CursesError, Result};

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Configuration knobs applied when a screen is initialized.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Terminal name to load the description for; `$TERM` when unset.
    pub term: Option<String>,
    /// Enable keypad decoding right after the screen is created.
    pub keypad: bool,
}

#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    capabilities: &'static Capabilities,
    screen: Option<Screen>,
}

impl TerminalSession {
    /// Claim the process-wide session.
    ///
    /// Fails with [`CursesError::SessionActive`] while another handle is
    /// alive.
    pub fn acquire(options: SessionOptions) -> Result<Self> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CursesError::SessionActive);
        }

        init_locale();
        let capabilities = capabilities();
        debug!("terminal session acquired ({})", capabilities.backend().name());

        Ok(Self {
            options,
            capabilities,
            screen: None,
        })
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.capabilities
    }

    /// Create the primary screen on `output`, loading the terminal
    /// description named in the options.
    pub fn init_screen(&mut self, output: BorrowedFd<'_>) -> Result<&mut Screen> {
        let caps = TermCaps::load(self.options.term.as_deref())?;
        self.init_screen_with_caps(output, caps)
    }

    /// Create the primary screen from an already loaded description.
    /// Replaces (and restores) any previous screen.
    pub fn init_screen_with_caps(
        &mut self,
        output: BorrowedFd<'_>,
        caps: TermCaps,
    ) -> Result<&mut Screen> {
        if let Some(previous) = self.screen.take() {
            previous.end()?;
        }

        let mut screen = Screen::open(output, caps)?;
        if self.options.keypad {
            screen.set_keypad(true)?;
        }

        Ok(self.screen.insert(screen))
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    /// Toggle extended-key decoding on the primary screen.
    ///
    /// Fails with [`CursesError::ScreenNotInitialized`] before
    /// [`TerminalSession::init_screen`].
    pub fn configure_keypad(&mut self, enable: bool) -> Result<()> {
        self.screen
            .as_mut()
            .ok_or(CursesError::ScreenNotInitialized)?
            .set_keypad(enable)
    }

    /// Number of color pairs the active terminal declares, zero before a
    /// screen exists.
    pub fn color_pair_capacity(&self) -> u32 {
        self.screen.as_ref().map_or(0, Screen::color_pairs)
    }

    /// Restore the terminal and drop the screen; the session stays usable.
    pub fn end_screen(&mut self) -> Result<()> {
        match self.screen.take() {
            Some(screen) => screen.end(),
            None => Ok(()),
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.screen.take();
        ACTIVE.store(false, Ordering::Release);
        debug!("terminal session released");
    }
}

/// Serializes tests that need the process-wide session.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::Mutex;

    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
